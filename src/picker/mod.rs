use dialoguer::Select;

use crate::{Ec2ConnectError, Result};

/// One entry in an interactive list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<T> {
    pub title: String,
    pub value: T,
    /// Reason the entry cannot be picked, if any
    pub disabled: Option<String>,
}

impl<T> Choice<T> {
    pub fn is_enabled(&self) -> bool {
        self.disabled.is_none()
    }

    /// Text rendered in the picker
    pub fn label(&self) -> String {
        match self.disabled {
            Some(ref reason) => format!("{} - {}", self.title, reason),
            None => self.title.clone(),
        }
    }
}

fn first_enabled<T>(choices: &[Choice<T>]) -> Option<usize> {
    choices.iter().position(Choice::is_enabled)
}

fn prompt_error(err: dialoguer::Error) -> Ec2ConnectError {
    Ec2ConnectError::Command(format!("Failed to read selection: {}", err))
}

/// Ask the user to pick one entry. Disabled entries stay visible but
/// picking one prompts again.
pub fn select<T: Clone>(prompt: &str, choices: &[Choice<T>]) -> Result<T> {
    if choices.is_empty() {
        return Err(Ec2ConnectError::NoInstances);
    }

    let mut default = first_enabled(choices).ok_or(Ec2ConnectError::NothingSelectable)?;
    let items: Vec<String> = choices.iter().map(Choice::label).collect();

    loop {
        let selection = Select::new()
            .with_prompt(prompt)
            .items(&items)
            .default(default)
            .interact_opt()
            .map_err(prompt_error)?
            .ok_or(Ec2ConnectError::Cancelled)?;

        let choice = &choices[selection];
        match choice.disabled {
            Some(ref reason) => {
                eprintln!("{} cannot be selected: {}", choice.title, reason);
                default = selection;
            }
            None => return Ok(choice.value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(title: &str, disabled: Option<&str>) -> Choice<u8> {
        Choice {
            title: title.to_string(),
            value: 0,
            disabled: disabled.map(String::from),
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(choice("i-1 (web)", None).label(), "i-1 (web)");
        assert_eq!(
            choice("i-2", Some("No public DNS")).label(),
            "i-2 - No public DNS"
        );
    }

    #[test]
    fn test_first_enabled() {
        let choices = vec![
            choice("i-1", Some("No public DNS")),
            choice("i-2", None),
            choice("i-3", None),
        ];
        assert_eq!(first_enabled(&choices), Some(1));

        let choices = vec![choice("i-1", Some("No public DNS"))];
        assert_eq!(first_enabled(&choices), None);
    }

    #[test]
    fn test_prompt_error_is_not_a_config_error() {
        let err = prompt_error(dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "not a terminal",
        )));
        assert!(matches!(err, Ec2ConnectError::Command(_)));
        let message = err.to_string();
        assert!(message.starts_with("Command failed: Failed to read selection: "));
        assert!(message.contains("not a terminal"));
    }

    #[test]
    fn test_select_rejects_empty_and_all_disabled() {
        let empty: Vec<Choice<u8>> = Vec::new();
        assert!(matches!(
            select("Pick", &empty),
            Err(Ec2ConnectError::NoInstances)
        ));

        let disabled = vec![choice("i-1", Some("No public DNS"))];
        assert!(matches!(
            select("Pick", &disabled),
            Err(Ec2ConnectError::NothingSelectable)
        ));
    }
}
