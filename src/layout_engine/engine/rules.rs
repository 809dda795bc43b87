use regex::Regex;
use tracing::warn;

use crate::common::config::WindowRule;
use crate::sys::window::WindowHandle;

#[derive(Debug)]
struct CompiledRule {
    class: Option<Regex>,
    caption: Option<Regex>,
    tile: bool,
}

impl CompiledRule {
    fn matches(&self, class: &str, caption: &str) -> bool {
        self.class.as_ref().is_none_or(|re| re.is_match(class))
            && self.caption.as_ref().is_none_or(|re| re.is_match(caption))
    }
}

/// Decides whether a new window starts tiled. The first rule whose patterns
/// all match the whole class and caption wins; windows no rule matches are
/// tiled.
#[derive(Debug, Default)]
pub struct WindowRules {
    rules: Vec<CompiledRule>,
}

impl WindowRules {
    /// Rules with an invalid pattern are logged and skipped.
    pub fn compile(rules: &[WindowRule]) -> Self {
        let anchored = |pattern: &Option<String>| -> Result<Option<Regex>, regex::Error> {
            pattern.as_deref().map(|p| Regex::new(&format!("^(?:{p})$"))).transpose()
        };
        let rules = rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                let compiled = anchored(&rule.class).and_then(|class| {
                    Ok(CompiledRule { class, caption: anchored(&rule.caption)?, tile: rule.tile })
                });
                compiled.inspect_err(|e| warn!(index, "skipping window rule: {e}")).ok()
            })
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize { self.rules.len() }

    pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    pub fn should_tile(&self, window: &dyn WindowHandle) -> bool {
        if !window.is_resizable() {
            return false;
        }
        let (class, caption) = (window.class(), window.caption());
        self.rules
            .iter()
            .find(|rule| rule.matches(&class, &caption))
            .is_none_or(|rule| rule.tile)
    }
}
