//! Canned coaching responses used when the completion endpoint is unavailable

/// Coaching topic picked from the user's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Budgeting,
    Investing,
    Saving,
    Debt,
    Overview,
}

/// Keyword rules, checked in order. First match wins.
const RULES: [(Topic, &[&str]); 4] = [
    (Topic::Budgeting, &["budget", "spending"]),
    (Topic::Investing, &["invest", "portfolio"]),
    (Topic::Saving, &["save", "savings"]),
    (Topic::Debt, &["debt", "loan"]),
];

const BUDGETING: &str = "🎯 Great question about budgeting! Here's my proven approach:\n\n💰 **The 50/30/20 Rule Plus**:\n• 50% for needs (rent, utilities, groceries)\n• 30% for wants (entertainment, dining)\n• 20% for savings and debt repayment\n\n📊 **Smart Budgeting Tips**:\n1. Track expenses for 30 days to see patterns\n2. Use the envelope method for discretionary spending\n3. Automate savings before you can spend it\n4. Review and adjust monthly\n\n🔍 Which category would you like to dive deeper into? I can help you optimize any area of your budget!";

const INVESTING: &str = "📈 Excellent! Let's build your investment strategy:\n\n🏗️ **Foundation First**:\n1. Emergency fund (3-6 months expenses) ✅\n2. Pay off high-interest debt (>7% APR)\n3. Max employer 401k match if available\n\n💎 **Investment Hierarchy**:\n• **Conservative**: Index funds (VTI, VTIAX)\n• **Moderate**: 70% stocks, 30% bonds\n• **Aggressive**: Growth stocks, sector ETFs\n\n⏰ **Time Horizon Matters**:\n• 5+ years: Stock-heavy portfolio\n• 2-5 years: Balanced approach\n• <2 years: High-yield savings/CDs\n\nWhat's your investment timeline and risk tolerance? Let's create a personalized strategy! 🚀";

const SAVING: &str = "💰 Let's supercharge your savings strategy!\n\n🎯 **High-Impact Savings Methods**:\n1. **Automate Everything**: Set up automatic transfers on payday\n2. **Pay Yourself First**: Save before spending\n3. **The 1% Challenge**: Increase savings rate by 1% monthly\n4. **Round-Up Apps**: Spare change adds up fast\n\n🏆 **Savings Goals Framework**:\n• **Emergency Fund**: Start with $1,000, build to 6 months\n• **Short-term**: Vacation, car, home improvements\n• **Long-term**: House down payment, retirement\n\n💡 **Pro Tip**: Use high-yield savings accounts (currently 4-5% APY) for emergency funds.\n\nWhat's your current savings goal? Let's create a roadmap to achieve it! 🎯";

const DEBT: &str = "⚡ Let's tackle that debt strategically!\n\n🎯 **Debt Elimination Strategies**:\n\n**Avalanche Method** (Best for math):\n• Pay minimums on all debts\n• Attack highest interest rate first\n• Saves most money long-term\n\n**Snowball Method** (Best for motivation):\n• Pay minimums on all debts\n• Attack smallest balance first\n• Builds momentum and confidence\n\n💳 **Credit Card Optimization**:\n1. Balance transfer to 0% APR card\n2. Negotiate lower rates with current cards\n3. Consider debt consolidation loan\n\n📊 What types of debt are you dealing with? Share the balances and interest rates, and I'll create a personalized payoff plan! 💪";

const OVERVIEW: &str = "🪙 Welcome to InvestWize! I'm here to help transform your financial future.\n\n🎯 **I can help you with**:\n• 📊 Smart budgeting and expense tracking\n• 📈 Investment strategies and portfolio building\n• 💰 Savings optimization and goal planning\n• ⚡ Debt management and elimination\n• 🏠 Financial planning for major purchases\n• 🎓 Financial education and literacy\n\n💡 **Popular questions I answer**:\n\"How should I start investing with $1000?\"\n\"What's the best budgeting method for beginners?\"\n\"How can I save for a house down payment?\"\n\"Should I pay off debt or invest first?\"\n\nWhat financial goal are you working towards? Let's create a plan together! 🚀\n\n*Remember: This is educational content. Always consult licensed financial advisors for major financial decisions.*";

impl Topic {
    /// Pick the topic for `text` by case-insensitive substring match
    pub fn classify(text: &str) -> Topic {
        let lower = text.to_lowercase();
        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(topic, _)| *topic)
            .unwrap_or(Topic::Overview)
    }

    pub fn response(self) -> &'static str {
        match self {
            Topic::Budgeting => BUDGETING,
            Topic::Investing => INVESTING,
            Topic::Saving => SAVING,
            Topic::Debt => DEBT,
            Topic::Overview => OVERVIEW,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Budgeting => "budgeting",
            Topic::Investing => "investing",
            Topic::Saving => "saving",
            Topic::Debt => "debt",
            Topic::Overview => "overview",
        }
    }
}

pub fn fallback_response(text: &str) -> &'static str {
    Topic::classify(text).response()
}
