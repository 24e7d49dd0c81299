//! Access tokens in the Secret Service keyring, one item per API server.

use std::collections::HashMap;

pub(crate) const SERVICE_NAME: &str = "ascend-api";

fn attrs(server: &str) -> HashMap<&str, &str> {
    HashMap::from([("service", SERVICE_NAME), ("server", server)])
}

async fn connect() -> Result<oo7::Keyring, String> {
    oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))
}

async fn find(keyring: &oo7::Keyring, server: &str) -> Result<Vec<oo7::Item>, String> {
    keyring
        .search_items(&attrs(server))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))
}

/// Store the token for `server`, replacing any earlier one.
pub async fn store_token(server: &str, token: &str) -> Result<(), String> {
    let label = format!("Ascend access token ({})", server);
    connect()
        .await?
        .create_item(&label, &attrs(server), token.as_bytes(), true)
        .await
        .map_err(|e| format!("Failed to store token: {}", e))
}

pub async fn load_token(server: &str) -> Result<Option<String>, String> {
    let keyring = connect().await?;
    let Some(item) = find(&keyring, server).await?.into_iter().next() else {
        log::debug!("No stored token for {}", server);
        return Ok(None);
    };
    let secret = item
        .secret()
        .await
        .map_err(|e| format!("Failed to read secret: {}", e))?;
    String::from_utf8(secret.to_vec())
        .map(Some)
        .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))
}

/// Forget the stored token (logout).
pub async fn delete_token(server: &str) -> Result<(), String> {
    let keyring = connect().await?;
    for item in find(&keyring, server).await? {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete token: {}", e))?;
    }
    Ok(())
}
