use crate::dataset::ProfessionalRecord;
use echolink_core::{EchoLinkError, EchoLinkResult, Persona, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Agent identity plus a purpose template filled in per professional.
///
/// Placeholders in `purpose_template`: `{first_name}`, `{recommendation}`,
/// `{product_used}`, `{feedback}`, `{training_completed}`,
/// `{training_in_progress}`, `{training_not_started}`.
///
/// `stage_notes` is keyed by stage number ("1" to "8"). A configured table
/// replaces the built-in notes as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaTemplate {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_team")]
    pub team: String,
    #[serde(default = "default_conversation_type")]
    pub conversation_type: String,
    #[serde(default = "default_purpose_template")]
    pub purpose_template: String,
    #[serde(default)]
    pub talking_points: String,
    #[serde(default = "default_stage_notes")]
    pub stage_notes: BTreeMap<String, String>,
}

fn default_name() -> String {
    "Sophia".into()
}

fn default_role() -> String {
    "promoter of new products, features and trainings who also gathers feedback from professionals"
        .into()
}

fn default_team() -> String {
    "R&D".into()
}

fn default_conversation_type() -> String {
    "chat".into()
}

fn default_purpose_template() -> String {
    "introduce the {recommendation} product(s) and explain how they help, recommend taking the \
     training on and exploring {training_not_started}, and encourage completing the training on \
     {training_in_progress}. Ask for {feedback} on the {product_used} product and congratulate \
     them on completing the {training_completed} training. Finally ask whether they are \
     interested in a demo of any product they like."
        .into()
}

fn default_stage_notes() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "2".into(),
            "The three new products are FINANCIAL STATEMENTS AUTOMATION, AUDITING AUTOMATION and \
             COMPLIANCE AUTOMATION. The training on them has to be done by June 15th, before the \
             functionality is rolled out."
                .into(),
        ),
        (
            "3".into(),
            "FINANCIAL STATEMENTS AUTOMATION automates the generation and management of financial \
             statements, reducing manual errors and saving significant time. AUDITING AUTOMATION \
             enhances the auditing process by automating routine tasks and analytics, increasing \
             the accuracy and speed of audit reports. COMPLIANCE AUTOMATION ensures financial \
             practices adhere to the latest regulations automatically, reducing the risk of \
             non-compliance and its penalties."
                .into(),
        ),
        (
            "8".into(),
            "More information on the products is at https://aimakerspace.io/ and \
             https://www.youtube.com/@AI-Makerspace/featured"
                .into(),
        ),
    ])
}

impl Default for PersonaTemplate {
    fn default() -> Self {
        Self {
            name: default_name(),
            role: default_role(),
            team: default_team(),
            conversation_type: default_conversation_type(),
            purpose_template: default_purpose_template(),
            talking_points: String::new(),
            stage_notes: default_stage_notes(),
        }
    }
}

impl PersonaTemplate {
    /// Reject `stage_notes` keys that do not name a stage.
    pub fn validate(&self) -> EchoLinkResult<()> {
        match self.stage_notes.keys().find(|key| stage_key(key).is_none()) {
            Some(key) => Err(EchoLinkError::Config(format!(
                "persona.stage_notes key '{key}' is not a stage number between 1 and 8"
            ))),
            None => Ok(()),
        }
    }

    /// Persona for one professional, purpose interpolated from their record.
    pub fn render(&self, record: &ProfessionalRecord) -> Persona {
        let purpose = [
            ("{first_name}", record.first_name.clone()),
            ("{recommendation}", record.recommendation.clone()),
            ("{product_used}", record.product_used.clone()),
            ("{feedback}", record.feedback.clone()),
            ("{training_completed}", join_list(&record.training_completed)),
            ("{training_in_progress}", join_list(&record.training_in_progress)),
            ("{training_not_started}", join_list(&record.training_not_started)),
        ]
        .iter()
        .fold(self.purpose_template.clone(), |acc, (placeholder, value)| {
            acc.replace(placeholder, value)
        });

        Persona {
            name: self.name.clone(),
            role: self.role.clone(),
            team: self.team.clone(),
            conversation_type: self.conversation_type.clone(),
            professional_name: record.first_name.clone(),
            purpose,
            talking_points: self.talking_points.clone(),
            stage_notes: self
                .stage_notes
                .iter()
                .filter_map(|(key, note)| Some((stage_key(key)?.number(), note.clone())))
                .collect(),
        }
    }
}

fn stage_key(key: &str) -> Option<Stage> {
    key.trim().parse::<u8>().ok().and_then(Stage::from_number)
}

fn join_list(items: &[String]) -> String {
    match items {
        [] => "none".into(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record() -> ProfessionalRecord {
        ProfessionalRecord {
            user_id: "dana@example.com".into(),
            first_name: "Dana".into(),
            last_name: "Lee".into(),
            email: "dana@example.com".into(),
            training: "Q2".into(),
            product_used: "Reporting".into(),
            recommendation: "Audit Assist".into(),
            feedback: "feedback".into(),
            training_completed: vec!["Reporting".into()],
            training_in_progress: vec![],
            training_not_started: vec!["Audit Assist".into(), "Compliance".into(), "Ledger".into()],
        }
    }

    #[test]
    fn fills_every_placeholder() {
        let persona = PersonaTemplate::default().render(&record());
        assert_eq!(persona.professional_name, "Dana");
        assert_eq!(persona.name, "Sophia");
        assert!(!persona.purpose.contains('{'));
        assert!(persona.purpose.contains("exploring Audit Assist, Compliance and Ledger"));
        assert!(persona.purpose.contains("training on none."));
        assert!(persona.purpose.contains("the Reporting product"));
    }

    #[test]
    fn custom_template_from_toml() {
        let template: PersonaTemplate = toml::from_str(
            r#"
            name = "Ava"
            purpose_template = "check in with {first_name} about {product_used}."
            "#,
        )
        .unwrap();
        let persona = template.render(&record());
        assert_eq!(persona.name, "Ava");
        assert_eq!(persona.team, "R&D");
        assert_eq!(persona.purpose, "check in with Dana about Reporting.");
        assert!(persona.note_for(Stage::EndConversation).is_some());
    }

    #[test]
    fn default_notes_carry_products_deadline_and_links() {
        let persona = PersonaTemplate::default().render(&record());
        let announce = persona.note_for(Stage::ValueProp1).unwrap();
        assert!(announce.contains("June 15th"));
        assert!(announce.contains("AUDITING AUTOMATION"));
        assert!(persona
            .note_for(Stage::ValueProp2)
            .unwrap()
            .contains("reducing the risk of non-compliance"));
        let end = persona.note_for(Stage::EndConversation).unwrap();
        assert!(end.contains("https://aimakerspace.io/"));
        assert!(end.contains("https://www.youtube.com/@AI-Makerspace/featured"));
        assert_eq!(persona.note_for(Stage::Close), None);
    }

    #[test]
    fn configured_notes_replace_defaults() {
        let template: PersonaTemplate = toml::from_str(
            r#"
            [stage_notes]
            8 = "Docs live at https://docs.example.com"
            "#,
        )
        .unwrap();
        template.validate().unwrap();
        let persona = template.render(&record());
        assert_eq!(persona.note_for(Stage::ValueProp1), None);
        assert_eq!(
            persona.note_for(Stage::EndConversation),
            Some("Docs live at https://docs.example.com")
        );
    }

    #[test]
    fn unknown_stage_key_is_rejected() {
        let template: PersonaTemplate = toml::from_str(
            r#"
            [stage_notes]
            9 = "no such stage"
            "#,
        )
        .unwrap();
        let err = template.validate().unwrap_err();
        assert!(err.to_string().contains("'9'"));
    }
}
