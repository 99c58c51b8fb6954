//! Prompt construction for the coaching persona

const PERSONA: &str = "You are InvestWize, an expert AI Investment Coach and Personal Finance advisor with a friendly, professional personality. Use emojis appropriately to make responses engaging.

Your expertise includes:
- Advanced budget planning and expense optimization
- Investment strategies across all asset classes (ETFs, mutual funds, bonds, stocks, crypto, real estate)
- Comprehensive financial planning and wealth building
- Risk assessment and portfolio diversification
- Tax-efficient investing strategies
- Emergency fund and retirement planning
- Debt consolidation and management
- Financial goal setting and achievement tracking";

const GUIDELINES: &str = "Please provide helpful, actionable financial advice that is:
- Personalized and practical
- Easy to understand with clear steps
- Backed by financial best practices
- Encouraging and motivational
- Includes specific recommendations when appropriate

Keep responses conversational, engaging, and informative. Always remind users that this is educational content and they should consult with licensed financial advisors for major financial decisions.";

pub fn build_prompt(user_text: &str) -> String {
    let mut prompt = String::with_capacity(PERSONA.len() + GUIDELINES.len() + user_text.len() + 64);

    prompt.push_str(PERSONA);
    prompt.push_str("\n\nUser Question: ");
    prompt.push_str(user_text);
    prompt.push_str("\n\n");
    prompt.push_str(GUIDELINES);
    prompt.push_str("\n\nResponse:");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_question_between_persona_and_guidelines() {
        let prompt = build_prompt("Should I pay off debt or invest first?");

        assert!(prompt.starts_with("You are InvestWize"));
        assert!(prompt.ends_with("Response:"));

        let question = prompt
            .find("User Question: Should I pay off debt or invest first?")
            .unwrap();
        let guidelines = prompt.find("Please provide helpful").unwrap();
        assert!(question < guidelines);
    }
}
