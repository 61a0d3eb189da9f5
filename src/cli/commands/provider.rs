use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("provider-url")
                .long("provider-url")
                .help("Identity provider base URL, example: https://<project>.example.co (memory:// for an in-process provider)")
                .env("AUTHGATE_PROVIDER_URL")
                .required(true),
        )
        .arg(
            Arg::new("provider-key")
                .long("provider-key")
                .help("Identity provider publishable API key")
                .env("AUTHGATE_PROVIDER_KEY")
                .hide_env_values(true),
        )
}
