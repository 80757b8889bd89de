//! System prompt composition.

use super::config::AgentConfig;

const REACT_INSTRUCTIONS: &str = "\
You work in a loop of reasoning, acting, and observing.
- Reason about what you need to do next.
- Act by calling one of the available tools when you need information or need to make something happen.
- Observe the tool result, which is returned to you, and continue.
When you have enough information, reply with your final answer without calling any tool.";

/// Compose the agent's base prompt, the loop contract, and its tool list.
pub fn build_system_prompt(agent: &AgentConfig) -> String {
    let mut prompt = String::with_capacity(agent.system_prompt.len() + 512);
    prompt.push_str(agent.system_prompt.trim_end());
    prompt.push_str("\n\n");
    prompt.push_str(REACT_INSTRUCTIONS);
    prompt.push_str("\n\nAvailable tools:\n");

    if agent.tools.is_empty() {
        prompt.push_str("(none)");
        return prompt;
    }

    let lines: Vec<String> = agent
        .tools
        .iter()
        .map(|tool| {
            let description = tool
                .description
                .as_deref()
                .or_else(|| {
                    tool.parameters
                        .as_ref()
                        .and_then(|p| p.get("description"))
                        .and_then(|d| d.as_str())
                })
                .unwrap_or("No description provided.");
            format!("- {}: {}", tool.name, description)
        })
        .collect();
    prompt.push_str(&lines.join("\n"));
    prompt
}
