use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the 8 fixed phases of an outreach conversation.
///
/// Stages are numbered 1 through 8. The number is what the stage classifier
/// answers with; the description is injected into generation prompts as the
/// instruction for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Greet the professional and introduce the agent.
    #[default]
    Introduction,
    /// Announce the new products and the training that accompanies them.
    ValueProp1,
    /// Explain how each product helps in day-to-day work.
    ValueProp2,
    /// Uncover needs and pain points with open-ended questions.
    NeedsAnalysis,
    /// Present the products as the answer to the stated needs.
    SolutionPresentation,
    /// Address objections with evidence.
    ObjectionHandling,
    /// Ask about interest in learning more or seeing a demo.
    Close,
    /// Wrap up and point to further resources. Terminal.
    EndConversation,
}

impl Stage {
    /// All stages in numeric order.
    pub const ALL: [Stage; 8] = [
        Stage::Introduction,
        Stage::ValueProp1,
        Stage::ValueProp2,
        Stage::NeedsAnalysis,
        Stage::SolutionPresentation,
        Stage::ObjectionHandling,
        Stage::Close,
        Stage::EndConversation,
    ];

    /// The 1-based stage number used by the classifier.
    pub fn number(self) -> u8 {
        match self {
            Stage::Introduction => 1,
            Stage::ValueProp1 => 2,
            Stage::ValueProp2 => 3,
            Stage::NeedsAnalysis => 4,
            Stage::SolutionPresentation => 5,
            Stage::ObjectionHandling => 6,
            Stage::Close => 7,
            Stage::EndConversation => 8,
        }
    }

    /// Map a classifier number back to a stage. Out-of-range values yield `None`.
    pub fn from_number(n: u8) -> Option<Stage> {
        match n {
            1..=8 => Some(Self::ALL[usize::from(n) - 1]),
            _ => None,
        }
    }

    /// Short human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Introduction => "Introduction",
            Stage::ValueProp1 => "Value proposition 1",
            Stage::ValueProp2 => "Value proposition 2",
            Stage::NeedsAnalysis => "Needs analysis",
            Stage::SolutionPresentation => "Solution presentation",
            Stage::ObjectionHandling => "Objection handling",
            Stage::Close => "Close",
            Stage::EndConversation => "End conversation",
        }
    }

    /// Behavioural instruction for the stage.
    pub fn description(self) -> &'static str {
        match self {
            Stage::Introduction => {
                "Start the conversation by introducing yourself. Be polite and respectful while \
                 keeping the tone of the conversation professional."
            }
            Stage::ValueProp1 => {
                "Explain that the firm is releasing new products that help the professional in \
                 their day to day work, and that a training has been put together to explain \
                 their functionality before roll-out."
            }
            Stage::ValueProp2 => {
                "Briefly explain how each product helps the professional use technology in their \
                 work, reducing manual effort and errors."
            }
            Stage::NeedsAnalysis => {
                "Ask open-ended questions to uncover the professional's needs and pain points. \
                 Listen carefully to their responses and take notes."
            }
            Stage::SolutionPresentation => {
                "Based on the professional's needs, present the products/services as the solution \
                 that can address their pain points."
            }
            Stage::ObjectionHandling => {
                "Address any objections the professional may have regarding the products/services. \
                 Be prepared to provide evidence or testimonials to support your claims."
            }
            Stage::Close => {
                "Ask the professional if they are interested to know more about any product or \
                 interested in a demo of any product to understand it better."
            }
            Stage::EndConversation => {
                "It's time to end the chat by telling the professional where they can find more \
                 information regarding the products/services."
            }
        }
    }

    /// Whether no transitions leave this stage.
    pub fn is_terminal(self) -> bool {
        self == Stage::EndConversation
    }

    /// Interpret a raw classifier answer.
    ///
    /// The first run of ASCII digits is read as the stage number. Anything
    /// that does not name a stage in 1..=8 yields `None`.
    pub fn parse_verdict(raw: &str) -> Option<Stage> {
        let digits: String = raw
            .trim()
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse::<u8>().ok().and_then(Stage::from_number)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.description())
    }
}
