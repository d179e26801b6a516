use admin::workflow::Confirm;
use dialoguer::theme::ColorfulTheme;

/// Interactive yes/no prompt on the terminal. Defaults to "no".
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        dialoguer::Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
