//! Prompt composition for the Cyber-Santa persona.

use super::ChatMessage;

/// Persona preamble sent with every request.
pub const PERSONA: &str = "You are Cyber-Santa, a futuristic version of Santa Claus who is obsessed with video games, esports, and technology.";

const GUIDELINES: [&str; 4] = [
    "Use gamer slang (poggers, gg, noob, glitch, nerf, buff) mixed with Christmas cheer.",
    "Be helpful but keep it entertaining.",
    "Keep response under 300 characters.",
    "If asked about games, recommend high-energy titles.",
];

/// Build the instruction text: persona, full prior transcript, the new user
/// message and the reply guidelines.
pub fn compose_prompt(history: &[ChatMessage], text: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(PERSONA);
    prompt.push_str("\n\n");

    if !history.is_empty() {
        prompt.push_str("Conversation so far:\n");
        for message in history {
            prompt.push_str(&format!("{}: {}\n", message.role.speaker(), message.text));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("User message: \"{text}\"\n"));
    prompt.push_str("\nGuidelines:\n");
    for (idx, line) in GUIDELINES.iter().enumerate() {
        prompt.push_str(&format!("{}. {line}\n", idx + 1));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    #[test]
    fn prompt_embeds_history_in_order() {
        let history = vec![
            ChatMessage::new("1", Role::Model, "Ho Ho Ho!"),
            ChatMessage::new("2", Role::User, "best racing game?"),
            ChatMessage::new("3", Role::Model, "Excel Math Racer, gg"),
        ];
        let prompt = compose_prompt(&history, "thanks");

        assert!(prompt.starts_with(PERSONA));
        let first = prompt.find("Cyber-Santa: Ho Ho Ho!").expect("greeting missing");
        let second = prompt.find("User: best racing game?").expect("question missing");
        let third = prompt.find("Cyber-Santa: Excel Math Racer, gg").expect("reply missing");
        assert!(first < second && second < third);
        assert!(prompt.contains("User message: \"thanks\""));
        assert!(prompt.contains("3. Keep response under 300 characters."));
    }

    #[test]
    fn prompt_without_history_skips_transcript() {
        let prompt = compose_prompt(&[], "hi");
        assert!(!prompt.contains("Conversation so far"));
        assert!(prompt.contains("User message: \"hi\""));
    }
}
