//! Self-describing spider metadata.
//!
//! The hosting framework indexes article sources by these fields. They
//! are capability-declaration data with no runtime mutation, so they
//! live in a `const` record rather than anywhere mutable.

/// Static description of this spider as presented to the host framework.
#[derive(Debug, Clone, Copy)]
pub struct PluginInfo {
    /// Source name, unique across spiders, immutable once a source
    /// model has been indexed under it.
    pub name: &'static str,
    /// Human-readable display name, refreshed on every run.
    pub display_name: &'static str,
    pub author: &'static str,
    pub email: &'static str,
    pub description: &'static str,
}

pub const SPIDER: PluginInfo = PluginInfo {
    name: "zhihu_daily",
    display_name: "知乎日报",
    author: "小貘",
    email: "moore@moorehy.com",
    description: "每天三次，每次七分钟。在中国，资讯类移动应用的人均阅读时长是 5 分钟，而在知乎日报，这个数字是 21",
};
