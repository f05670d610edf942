//! Identifier rewriting transformer.

use super::{ResourceState, SkipReason, TransformOutcome, Transformer};
use crate::config::IdTransform;
use crate::context::TransformContext;
use crate::pattern::{Pattern, Template, DEFAULT_TEMPLATE};

/// Identifier rewriting transformer.
#[derive(Debug, Clone)]
pub struct IdTransformer {
    /// Pattern matched against the current identifier
    pattern: Pattern,
    /// Replacement template
    template: Template,
}

impl IdTransformer {
    /// Create a new identifier transformer from configuration.
    pub fn new(config: &IdTransform) -> Result<Self, regex::Error> {
        let pattern = Pattern::new(&config.source_pattern)?;
        let template = pattern.template(
            config
                .target_template
                .as_deref()
                .unwrap_or(DEFAULT_TEMPLATE),
        );
        Ok(Self { pattern, template })
    }
}

impl Transformer for IdTransformer {
    /// Identifier rules chain unconditionally: the rewritten identifier is
    /// always committed, even when the pattern did not match.
    fn transform(
        &self,
        state: &mut ResourceState<'_>,
        _ctx: &TransformContext<'_>,
    ) -> TransformOutcome {
        let matched = self.pattern.matches(&state.id);
        state.id = self.pattern.replace_all(&state.id, &self.template);

        if matched {
            TransformOutcome::Applied
        } else {
            TransformOutcome::Skipped(SkipReason::NoMatch)
        }
    }

    fn name(&self) -> &'static str {
        "id_transformer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathCache;
    use crate::value::PropertyMap;

    fn make_transformer(pattern: &str, template: Option<&str>) -> IdTransformer {
        IdTransformer::new(&IdTransform {
            source_pattern: pattern.to_string(),
            target_template: template.map(str::to_string),
        })
        .unwrap()
    }

    fn run(transformers: &[IdTransformer], id: &str) -> String {
        let props = PropertyMap::new();
        let paths = PathCache::new();
        let ctx = TransformContext::new(None, &paths);
        let mut state = ResourceState::new(id, &props);
        for transformer in transformers {
            transformer.transform(&mut state, &ctx);
        }
        state.id
    }

    #[test]
    fn test_default_template() {
        let transformer = make_transformer("(.*)_avg$", None);
        assert_eq!(run(&[transformer], "v_horz_100m_avg"), "v_horz_100m");
    }

    #[test]
    fn test_two_step_chaining() {
        let transformers = [
            make_transformer(
                "(.*)very_long_name_which_should_be(.*)",
                Some("$1VLNWSB$2"),
            ),
            make_transformer("(.*)_shortened_in_two_steps", Some("$1SI2S")),
        ];
        assert_eq!(
            run(
                &transformers[..1],
                "temp_very_long_name_which_should_be_shortened_in_two_steps"
            ),
            "temp_VLNWSB_shortened_in_two_steps"
        );
        assert_eq!(
            run(
                &transformers,
                "temp_very_long_name_which_should_be_shortened_in_two_steps"
            ),
            "temp_VLNWSBSI2S"
        );
    }

    #[test]
    fn test_no_match_still_commits_unchanged_id() {
        let transformer = make_transformer("^x(.*)", None);
        let props = PropertyMap::new();
        let paths = PathCache::new();
        let ctx = TransformContext::new(None, &paths);
        let mut state = ResourceState::new("abc", &props);

        let outcome = transformer.transform(&mut state, &ctx);
        assert_eq!(outcome, TransformOutcome::Skipped(SkipReason::NoMatch));
        assert_eq!(state.id, "abc");
    }

    #[test]
    fn test_invalid_pattern() {
        let config = IdTransform {
            source_pattern: "[".to_string(),
            target_template: None,
        };
        assert!(IdTransformer::new(&config).is_err());
    }
}
