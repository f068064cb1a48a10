use std::io::Write;

use clap::{Args, Command};
use clap_complete::Shell;

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    pub fn generate(&self, command: &mut Command, out: &mut dyn Write) {
        let name = command.get_name().to_string();
        clap_complete::generate(self.shell, command, name, out);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::Cli;

    #[test]
    fn bash_script_mentions_subcommands() {
        let args = CompletionsArgs { shell: Shell::Bash };
        let mut out = Vec::new();
        args.generate(&mut Cli::command(), &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("tripplanctl"));
        assert!(script.contains("sweep"));
    }
}
