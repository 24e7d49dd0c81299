/// Grid size a widget takes when first added to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultLayout {
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub default_layout: DefaultLayout,
}

const SMALL: DefaultLayout = DefaultLayout {
    w: 4,
    h: 2,
    min_w: 3,
    min_h: 2,
};

pub const WIDGETS: &[WidgetSpec] = &[
    WidgetSpec {
        id: "clock",
        name: "Clock",
        default_layout: SMALL,
    },
    WidgetSpec {
        id: "tasks-summary",
        name: "Tasks Summary",
        default_layout: SMALL,
    },
];

pub fn find(id: &str) -> Option<&'static WidgetSpec> {
    WIDGETS.iter().find(|w| w.id == id)
}
