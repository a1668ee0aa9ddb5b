use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use shoosh::util::shell_join;
use shoosh::{
    exit_code_for_error, DockerCli, ExecOutput, MappingSet, RegistryProbe, RunSpec, Session,
    Settings, ShooshError,
};
use tracing::debug;

mod cli;

use cli::{Cli, Cmd};

/// Exit code to forward; signals and codes outside 0..=255 become 1.
fn status_exit_code(code: Option<i32>) -> u8 {
    code.map_or(1, |c| u8::try_from(c).unwrap_or(1))
}

fn forward(out: &ExecOutput) -> ExitCode {
    print!("{}", out.stdout);
    eprint!("{}", out.stderr);
    ExitCode::from(status_exit_code(out.status.code()))
}

fn probe(settings: &Settings) -> anyhow::Result<DockerCli> {
    Ok(DockerCli::detect(settings)?)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = Settings::from_env();
    debug!("settings: {:?}", settings);

    match cli.command {
        Cmd::Ps => {
            for name in probe(&settings)?.list_containers() {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Volumes { container } => {
            let vols = probe(&settings)?
                .list_volumes(&container)
                .with_context(|| format!("listing volumes of {container}"))?;
            for v in vols {
                println!("{v}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Start { container } => {
            let docker = probe(&settings)?;
            if !docker.contains(&container) {
                return Err(ShooshError::ContainerNotFound(container).into());
            }
            if cli.dry_run {
                eprintln!(
                    "shoosh: docker: {} start {}",
                    docker.runtime().display(),
                    container
                );
                return Ok(ExitCode::SUCCESS);
            }
            Ok(if docker.start(&container) {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Cmd::Run {
            image,
            name,
            volumes,
            ports,
        } => {
            let docker = probe(&settings)?;
            if docker.contains(&name) {
                return Err(ShooshError::ContainerAlreadyExists(name).into());
            }
            let mut spec = RunSpec::new(image, name).volumes(volumes);
            if !ports.is_empty() {
                spec = spec.ports(ports);
            }
            if cli.dry_run {
                let mut argv = vec![docker.runtime().display().to_string()];
                argv.extend(spec.to_args());
                eprintln!("shoosh: docker: {}", shell_join(&argv));
                return Ok(ExitCode::SUCCESS);
            }
            Ok(if docker.run(&spec) {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Cmd::Exec {
            container,
            maps,
            label_maps,
            no_inspect,
            sep,
            kwargs,
            command,
        } => {
            let mappings = if !label_maps.is_empty() {
                Some(MappingSet::labeled(label_maps))
            } else if !maps.is_empty() {
                Some(MappingSet::Ordered(maps))
            } else {
                None
            };
            let mut session = Session::new(Some(Box::new(probe(&settings)?)))
                .with_kwargs_sep(sep.unwrap_or(settings.kwargs_sep));
            session.configure(&container, mappings, !no_inspect)?;
            run_wrapped(&session, &command, &kwargs, cli.dry_run)
        }
        Cmd::Sh { command } => {
            let mut session = Session::from_settings(&settings);
            session.configure_host();
            run_wrapped(&session, &command, &[], cli.dry_run)
        }
    }
}

fn run_wrapped(
    session: &Session,
    command: &[String],
    kwargs: &[(String, String)],
    dry_run: bool,
) -> anyhow::Result<ExitCode> {
    let Some((program, args)) = command.split_first() else {
        bail!("no command given");
    };
    let wrapped = session.wrap(program.as_str());
    let kw = kwargs.iter().map(|(l, v)| (l.as_str(), v.as_str()));
    if dry_run {
        let line = wrapped.command_line(args, kw)?;
        eprintln!("shoosh: exec: {}", session.preview(&line)?);
        eprintln!("shoosh: dry-run requested; not executing.");
        return Ok(ExitCode::SUCCESS);
    }
    let out = wrapped.call(args, kw)?;
    Ok(forward(&out))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    shoosh::logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("shoosh: {e:#}");
            let code = e
                .downcast_ref::<ShooshError>()
                .map_or(1, exit_code_for_error);
            ExitCode::from(code)
        }
    }
}
