use clap::Parser;
use lockbox::cli::commands::{self, add::AddArgs, rotate::PolicyArgs};
use lockbox::cli::{Cli, Commands, DuressAction, ShardAction, StackAction};
use lockbox::crypto::CharClasses;
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr; user-facing output goes through cli::output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOCKBOX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { ref name } => commands::init::execute(&cli, name),
        Commands::Add {
            ref title,
            ref username,
            ref url,
            ref password,
            generate,
            ref notes,
            ref category,
            ref tags,
        } => commands::add::execute(
            &cli,
            AddArgs {
                title,
                username,
                url,
                password: password.as_deref(),
                generate,
                notes: notes.as_deref(),
                category: category.as_deref(),
                tags,
            },
        ),
        Commands::List => commands::list::execute(&cli),
        Commands::Search { ref query } => commands::list::search(&cli, query),
        Commands::Get { ref entry } => commands::get::execute(&cli, entry),
        Commands::Copy { ref entry } => commands::get::copy(&cli, entry),
        Commands::Rm { ref entry, force } => commands::delete::execute(&cli, entry, force),
        Commands::Generate {
            length,
            no_lowercase,
            no_uppercase,
            no_digits,
            no_symbols,
            passphrase,
        } => commands::generate::execute(
            length,
            CharClasses {
                lowercase: !no_lowercase,
                uppercase: !no_uppercase,
                digits: !no_digits,
                symbols: !no_symbols,
            },
            passphrase,
        ),
        Commands::Strength { ref password } => commands::generate::strength_cmd(password),
        Commands::Backup { ref output } => commands::backup::execute(&cli, output.as_deref()),
        Commands::Restore { ref file, force } => commands::backup::restore(&cli, file, force),
        Commands::ChangePassword => commands::change_password::execute(&cli),
        Commands::Share {
            ref entry,
            ttl,
            max_accesses,
        } => commands::share::execute(&cli, entry, ttl, max_accesses),
        Commands::OpenLink { ref link } => commands::share::open_link(&cli, link),
        Commands::Shard { ref action } => match action {
            ShardAction::Split { shards, ref output } => {
                commands::shard::split(&cli, *shards, output)
            }
            ShardAction::Combine { ref files } => commands::shard::combine(&cli, files),
        },
        Commands::Rotate {
            check,
            enable,
            interval_days,
            min_strength,
            ref exclude,
        } => commands::rotate::execute(
            &cli,
            check,
            PolicyArgs {
                enable,
                interval_days,
                min_strength,
                exclude,
            },
        ),
        Commands::SelfDestruct { max_attempts } => {
            commands::security::self_destruct(&cli, max_attempts)
        }
        Commands::Duress { ref action } => match action {
            DuressAction::Set => commands::security::duress_set(&cli),
            DuressAction::Disable => commands::security::duress_disable(&cli),
        },
        Commands::Stack { ref action } => match action {
            StackAction::Enable { ref phrases } => commands::security::stack_enable(&cli, phrases),
            StackAction::Disable => commands::security::stack_disable(&cli),
        },
        Commands::Audit { last } => commands::audit_cmd::execute(&cli, last),
    };

    if let Err(e) = result {
        lockbox::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
