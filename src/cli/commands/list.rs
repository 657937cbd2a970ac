use super::Context;
use crate::aws::InstanceDescriptor;
use crate::picker::Choice;
use crate::Result;

pub async fn execute(ctx: &Context, public_only: bool) -> Result<()> {
    let choices = ctx.instance_choices(public_only).await?;

    if choices.is_empty() {
        println!("No running instances found.");
        return Ok(());
    }

    for line in format_rows(&choices) {
        println!("{}", line);
    }

    Ok(())
}

fn format_rows(choices: &[Choice<InstanceDescriptor>]) -> Vec<String> {
    let width = choices.iter().map(|c| c.title.len()).max().unwrap_or(0);

    choices
        .iter()
        .map(|choice| {
            let instance = &choice.value;
            let mut line = format!(
                "{:<width$}  {}  {}",
                choice.title,
                instance.public_dns.as_deref().unwrap_or("-"),
                instance.private_dns,
            );
            if let Some(ref reason) = choice.disabled {
                line.push_str(&format!("  ({})", reason));
            }
            line
        })
        .collect()
}
