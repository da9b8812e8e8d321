//! String helpers for labels and plan document text fields

/// String cleanup extension trait
pub trait StringExt {
    /// Trimmed copy, `None` when blank
    fn clean(&self) -> Option<String>;

    /// Truncate to `max` characters, replacing the tail with `...` when longer
    fn ellipsize(&self, max: usize) -> String;
}

impl StringExt for str {
    #[inline]
    fn clean(&self) -> Option<String> {
        let trimmed = self.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }

    fn ellipsize(&self, max: usize) -> String {
        if self.chars().count() <= max {
            return self.to_string();
        }
        let keep = max.saturating_sub(3);
        let mut out: String = self.chars().take(keep).collect();
        out.push_str("...");
        out
    }
}

impl StringExt for String {
    #[inline]
    fn clean(&self) -> Option<String> {
        self.as_str().clean()
    }

    #[inline]
    fn ellipsize(&self, max: usize) -> String {
        self.as_str().ellipsize(max)
    }
}
