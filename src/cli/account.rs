use circulation::{Action, Outcome, Role, User};
use clap::Parser;
use tracing::instrument;

use super::{
    terminal::{self, Tone},
    Context,
};

#[derive(Debug, Parser)]
pub struct Register {
    /// The name to log in with
    name: String,

    /// The kind of account: `user` or `admin`
    #[arg(long = "type", default_value = "user")]
    role: Role,

    /// A contact phone number
    #[arg(long, default_value = "")]
    phone: String,

    /// A contact email address
    #[arg(long, default_value = "")]
    email: String,
}

impl Register {
    #[instrument(skip(context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let password = match &context.password {
            Some(password) => password.clone(),
            None => dialoguer::Password::new()
                .with_prompt(format!("Password for {}", self.name))
                .with_confirmation("Repeat password", "Passwords do not match")
                .interact()?,
        };

        let user = User::new(self.name, self.role, self.phone, self.email, password);
        let Outcome::Registered(user) = context.perform(Action::Register(user))? else {
            anyhow::bail!("unexpected outcome from registration");
        };

        println!(
            "{}",
            terminal::paint(
                format!("Registered {} as {}", user.name(), user.role()),
                Tone::Ok
            )
        );
        Ok(())
    }
}

/// Checks the `--user` credentials without changing anything.
#[instrument(skip(context))]
pub fn login(context: &Context) -> anyhow::Result<()> {
    let mut library = context.open()?;
    let session = context.login(&mut library)?;
    println!(
        "{}",
        terminal::paint(
            format!("Logged in as {} ({})", session.name, session.role),
            Tone::Ok
        )
    );
    Ok(())
}
