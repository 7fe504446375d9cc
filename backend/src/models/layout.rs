use serde::{Deserialize, Serialize};

use crate::models::{Indicator, Interval, Timeframe};

/// A market index shown in the snapshot strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub path: &'static str,
    pub title: &'static str,
    pub subtitle: Option<&'static str>,
}

pub const NAV_LINKS: [NavLink; 3] = [
    NavLink { label: "Home", href: "/" },
    NavLink { label: "Search", href: "/search" },
    NavLink { label: "News", href: "/news" },
];

pub const PAGES: [PageInfo; 2] = [
    PageInfo {
        path: "/",
        title: "📈 Stock Tracker",
        subtitle: Some("Your one-stop solution for stock market insights."),
    },
    PageInfo {
        path: "/news",
        title: "📰 Indian Stock Market News",
        subtitle: None,
    },
];

pub const FOOTER: &str = "© 2023 Stock Tracker. All rights reserved.";

/// Everything the front end needs to draw both pages' chrome and selectors.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardLayout {
    pub nav: Vec<NavLink>,
    pub pages: Vec<PageInfo>,
    pub footer: &'static str,
    pub indices: Vec<IndexDescriptor>,
    pub default_symbol: String,
    pub timeframes: Vec<Timeframe>,
    pub default_timeframe: Timeframe,
    pub intervals: Vec<Interval>,
    pub default_interval: Interval,
    pub indicators: Vec<Indicator>,
}

impl DashboardLayout {
    pub fn new(indices: Vec<IndexDescriptor>, default_symbol: String) -> Self {
        Self {
            nav: NAV_LINKS.to_vec(),
            pages: PAGES.to_vec(),
            footer: FOOTER,
            indices,
            default_symbol,
            timeframes: Timeframe::ALL.to_vec(),
            default_timeframe: Timeframe::default(),
            intervals: Interval::ALL.to_vec(),
            default_interval: Interval::default(),
            indicators: Indicator::ALL.to_vec(),
        }
    }
}
