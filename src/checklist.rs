//! Checklist view model: which remote assets are unlocked, plus totals

use crate::remote::RemoteAssetDescriptor;
use serde::Serialize;

/// One row of the checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub key: String,
    pub path: String,
    pub unlocked: bool,
}

/// The rendered comparison between the remote listing and the unlocked set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checklist {
    pub items: Vec<ChecklistItem>,
    pub unlocked_count: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent
    pub percent: u32,
}

impl Checklist {
    /// Rows sorted by path; one row per descriptor.
    pub fn build<S: AsRef<str>>(remote: &[RemoteAssetDescriptor], unlocked: &[S]) -> Self {
        let mut sorted: Vec<&RemoteAssetDescriptor> = remote.iter().collect();
        sorted.sort_by(|a, b| a.path.cmp(&b.path));

        let items: Vec<ChecklistItem> = sorted
            .into_iter()
            .map(|asset| {
                let key = asset.key();
                ChecklistItem {
                    key: key.to_string(),
                    path: asset.path.clone(),
                    unlocked: unlocked.iter().any(|u| u.as_ref() == key),
                }
            })
            .collect();

        let total = items.len();
        let unlocked_count = items.iter().filter(|i| i.unlocked).count();
        let percent = if total > 0 {
            ((unlocked_count as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        Self {
            items,
            unlocked_count,
            total,
            percent,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.unlocked_count == self.total
    }

    /// Plain-text rendering, one row per asset and a stats line.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            let icon = if item.unlocked { "✅" } else { "🔒" };
            out.push_str(&format!("{} {}\n", icon, item.key));
        }
        out.push_str(&format!(
            "📊 Unlocked: {} / {} ({}%)\n",
            self.unlocked_count, self.total, self.percent
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(paths: &[&str]) -> Vec<RemoteAssetDescriptor> {
        paths.iter().map(|p| RemoteAssetDescriptor::new(*p)).collect()
    }

    #[test]
    fn rows_sorted_by_path_and_marked() {
        let list = Checklist::build(&remote(&["h/c.png", "h/a.png", "h/b.png?v=3"]), &["b.png", "a.png"]);
        let keys: Vec<&str> = list.items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["a.png", "b.png", "c.png"]);
        assert_eq!(list.unlocked_count, 2);
        assert_eq!(list.total, 3);
        assert_eq!(list.percent, 67);
        assert!(!list.is_complete());
    }

    #[test]
    fn empty_listing_is_zero_percent() {
        let list = Checklist::build::<&str>(&[], &[]);
        assert_eq!(list.percent, 0);
        assert!(!list.is_complete());
    }

    #[test]
    fn stale_unlocks_do_not_count() {
        let list = Checklist::build(&remote(&["a.png"]), &["a.png", "gone.png"]);
        assert_eq!(list.unlocked_count, 1);
        assert_eq!(list.percent, 100);
        assert!(list.is_complete());
    }

    #[test]
    fn build_is_idempotent() {
        let r = remote(&["x/1.png", "x/2.png"]);
        let unlocked = vec!["2.png".to_string()];
        assert_eq!(Checklist::build(&r, &unlocked), Checklist::build(&r, &unlocked));
    }

    #[test]
    fn text_rendering_has_stats_line() {
        let text = Checklist::build(&remote(&["a.png", "b.png"]), &["a.png"]).render_text();
        assert!(text.contains("✅ a.png"));
        assert!(text.contains("🔒 b.png"));
        assert!(text.ends_with("📊 Unlocked: 1 / 2 (50%)\n"));
    }
}
