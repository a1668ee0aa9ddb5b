#![cfg(unix)]
mod common;

use std::sync::Arc;

use common::{output, pm, ScriptedRunner};
use shoosh::{DockerCli, RegistryProbe, RunSpec, ShooshError};

const PS: &str = "CONTAINER ID   IMAGE     COMMAND   CREATED   STATUS    PORTS     NAMES\n\
abc123   nginx   \"nginx\"   1 hour ago   Up 1 hour   80/tcp   web\n\
def456   postgres   \"pg\"   2 days ago   Exited (0)      db\n";

fn cli(runner: &ScriptedRunner) -> DockerCli {
    DockerCli::new("/usr/bin/docker", Arc::new(runner.clone()))
}

#[test]
fn test_list_containers_parses_names() {
    let runner = ScriptedRunner::new(vec![output(0, PS)]);
    assert_eq!(cli(&runner).list_containers(), vec!["web", "db"]);
    assert_eq!(runner.calls(), vec![vec!["ps", "-a"]]);
}

#[test]
fn test_list_containers_without_output_is_empty() {
    let runner = ScriptedRunner::new(vec![output(0, "")]);
    assert!(cli(&runner).list_containers().is_empty());
}

#[test]
fn test_list_containers_failure_is_empty() {
    let runner = ScriptedRunner::new(vec![output(1, PS)]);
    assert!(cli(&runner).list_containers().is_empty());
}

#[test]
fn test_list_volumes_issues_inspect_and_parses() {
    let json = r#"'[{"Type":"bind","Source":"/host/data","Destination":"/mnt/data"}]'"#;
    let runner = ScriptedRunner::new(vec![output(0, json)]);
    let vols = cli(&runner).list_volumes("web").unwrap();
    assert_eq!(vols, vec![pm("/host/data", "/mnt/data")]);
    assert_eq!(
        runner.calls(),
        vec![vec!["inspect", "-f", "{{json .Mounts}}", "web"]]
    );
}

#[test]
fn test_list_volumes_failed_inspect_is_parse_error() {
    let runner = ScriptedRunner::new(vec![output(1, "")]);
    assert!(matches!(
        cli(&runner).list_volumes("ghost"),
        Err(ShooshError::Parse { .. })
    ));
}

#[test]
fn test_start_missing_container_returns_false_without_start() {
    let runner = ScriptedRunner::new(vec![output(0, PS)]);
    assert!(!cli(&runner).start("cache"));
    assert_eq!(runner.calls().len(), 1);
}

#[test]
fn test_start_existing_container() {
    let runner = ScriptedRunner::new(vec![output(0, PS), output(0, "db\n")]);
    assert!(cli(&runner).start("db"));
    assert_eq!(runner.calls()[1], vec!["start", "db"]);
}

#[test]
fn test_run_duplicate_name_has_no_side_effects() {
    let runner = ScriptedRunner::new(vec![output(0, PS)]);
    let spec = RunSpec::new("nginx", "web");
    assert!(!cli(&runner).run(&spec));
    assert_eq!(runner.calls(), vec![vec!["ps", "-a"]]);
}

#[test]
fn test_run_new_container_with_volume_and_ports() {
    let runner = ScriptedRunner::new(vec![output(0, PS), output(0, "f00d\n")]);
    let spec = RunSpec::new("ubuntu:24.04", "box")
        .volumes(pm("/host/data", "/mnt/data"))
        .ports(vec!["8080:80".to_string()]);
    assert!(cli(&runner).run(&spec));
    assert_eq!(
        runner.calls()[1],
        vec!["run", "-dt", "--name", "box", "-v", "/host/data:/mnt/data", "ubuntu:24.04"]
    );
}

#[test]
fn test_baked_backend_execs_into_container() {
    let runner = ScriptedRunner::new(vec![output(0, "hi\n")]);
    let backend = cli(&runner).bake("web");
    let out = backend.run_line("echo hi").unwrap();
    assert_eq!(out.stdout, "hi\n");
    assert_eq!(
        runner.calls(),
        vec![vec!["exec", "-t", "web", "bash", "--login", "-c", "echo hi"]]
    );
}
