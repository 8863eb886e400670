// Copyright 2025 The Wharf Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use common::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wharf::cli::action::ActionCommand;
use wharf::cli::run_local::{RunLocalOpts, RunLocalVars};
use wharf::domain::manifest::WorkloadManifest;
use wharf::domain::model::{Environment, WorkloadType};

const MAIN: &str = "phonetool-test-api";
const PAUSE: &str = "phonetool-test-api-pause";

const SIDECAR_MANIFEST: &str = "name: api
type: Backend Service
image:
  location: app:1.0
  port: 8080
env_file: config/api.env
variables:
  LOG_LEVEL: info
sidecars:
  envoy:
    image: envoy:1.29
    port: 9901
    secrets:
      ADMIN_TOKEN: envoy/token
";

fn run_opts(
    vars: RunLocalVars,
    ws: FakeWorkspace,
    secrets: FakeSecrets,
    engine: Arc<FakeEngine>,
) -> RunLocalOpts {
    let store = FakeStore::new()
        .with_app("phonetool")
        .with_env("phonetool", "test")
        .with_workload("phonetool", "api", WorkloadType::LoadBalancedWebService);
    RunLocalOpts::new(
        vars,
        Arc::new(store),
        Arc::new(ws),
        Arc::new(FakeSelector::new()),
        Arc::new(secrets),
        engine,
    )
    .with_poll_interval(Duration::from_millis(10))
}

fn run_vars() -> RunLocalVars {
    RunLocalVars {
        app: "phonetool".to_string(),
        name: "api".to_string(),
        env_name: "test".to_string(),
        ..Default::default()
    }
}

fn secrets() -> FakeSecrets {
    FakeSecrets {
        values: HashMap::from([
            ("db/password".to_string(), "hunter2".to_string()),
            ("envoy/token".to_string(), "s3cr3t".to_string()),
        ]),
        error: None,
    }
}

#[tokio::test]
async fn test_plan_lays_out_pause_and_sidecars() {
    let ws = FakeWorkspace::new()
        .with_manifest("api", SIDECAR_MANIFEST)
        .with_file("config/api.env", "LOG_LEVEL=debug\nREGION=eu\n");
    let opts = run_opts(
        RunLocalVars {
            port_overrides: vec!["18080:8080".to_string()],
            env_overrides: vec!["LOG_LEVEL=trace".to_string(), "envoy:MODE=edge".to_string()],
            ..run_vars()
        },
        ws,
        secrets(),
        Arc::new(FakeEngine::default()),
    );
    let manifest = WorkloadManifest::parse("api", SIDECAR_MANIFEST.as_bytes()).unwrap();

    let plan = opts
        .plan(&Environment::new("phonetool", "test"), &manifest)
        .unwrap();

    assert_eq!(plan.pause.name, PAUSE);
    assert_eq!(plan.pause.ports, vec![(18080, 8080), (9901, 9901)]);
    assert!(plan.pause.network_of.is_none());

    let names: Vec<_> = plan.containers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec![MAIN, "phonetool-test-api-envoy"]);
    for container in &plan.containers {
        assert_eq!(container.network_of.as_deref(), Some(PAUSE));
        assert!(container.ports.is_empty());
        assert_eq!(container.env["WHARF_APPLICATION_NAME"], "phonetool");
    }

    let main = &plan.containers[0];
    assert_eq!(main.image, "app:1.0");
    assert_eq!(main.env["REGION"], "eu");
    assert_eq!(main.env["LOG_LEVEL"], "trace");
    assert_eq!(plan.containers[1].env["MODE"], "edge");
    assert_eq!(plan.overrides[MAIN]["LOG_LEVEL"], "trace");
    assert_eq!(plan.overrides["phonetool-test-api-envoy"]["MODE"], "edge");
    assert_eq!(
        plan.secrets["phonetool-test-api-envoy"]["ADMIN_TOKEN"],
        "envoy/token"
    );
}

#[tokio::test]
async fn test_plan_rejects_unknown_override_target() {
    let opts = run_opts(
        RunLocalVars {
            env_overrides: vec!["redis:MODE=x".to_string()],
            ..run_vars()
        },
        FakeWorkspace::new().with_file("config/api.env", ""),
        secrets(),
        Arc::new(FakeEngine::default()),
    );
    let manifest = WorkloadManifest::parse("api", SIDECAR_MANIFEST.as_bytes()).unwrap();

    let err = opts
        .plan(&Environment::new("phonetool", "test"), &manifest)
        .unwrap_err();
    assert!(err.to_string().contains("names a container that is not part of api"));
}

#[tokio::test]
async fn test_run_stops_everything_when_a_container_exits() {
    let engine = Arc::new(FakeEngine {
        exit_after: HashMap::from([(MAIN.to_string(), 2)]),
        ..Default::default()
    });
    let mut opts = run_opts(
        run_vars(),
        FakeWorkspace::new().with_manifest("api", LBWS_MANIFEST),
        secrets(),
        engine.clone(),
    );

    opts.validate().await.unwrap();
    opts.ask().await.unwrap();
    tokio::time::timeout(Duration::from_secs(10), opts.execute())
        .await
        .expect("run local should finish once the container exits")
        .unwrap();

    assert_eq!(engine.started_names(), vec![PAUSE, MAIN]);
    assert_eq!(engine.stopped(), vec![MAIN, PAUSE]);

    let started = engine.started.lock().unwrap().clone();
    assert_eq!(started[0].ports, vec![(80, 80)]);
    assert_eq!(started[1].env["DB_PASSWORD"], "hunter2");
    assert_eq!(started[1].env["LOG_LEVEL"], "info");
}

#[tokio::test]
async fn test_secret_failure_starts_nothing() {
    let engine = Arc::new(FakeEngine::default());
    let mut opts = run_opts(
        run_vars(),
        FakeWorkspace::new().with_manifest("api", LBWS_MANIFEST),
        FakeSecrets {
            values: HashMap::new(),
            error: Some("access denied".to_string()),
        },
        engine.clone(),
    );

    let err = opts.execute().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "get secrets: secret DB_PASSWORD for container phonetool-test-api: access denied"
    );
    assert!(engine.started_names().is_empty());
    assert!(engine.stopped().is_empty());
}

#[tokio::test]
async fn test_env_override_wins_over_secret() {
    let engine = Arc::new(FakeEngine {
        exit_after: HashMap::from([(MAIN.to_string(), 1)]),
        ..Default::default()
    });
    let mut opts = run_opts(
        RunLocalVars {
            env_overrides: vec!["DB_PASSWORD=local-dev".to_string()],
            ..run_vars()
        },
        FakeWorkspace::new().with_manifest("api", LBWS_MANIFEST),
        secrets(),
        engine.clone(),
    );

    tokio::time::timeout(Duration::from_secs(10), opts.execute())
        .await
        .expect("run local should finish once the container exits")
        .unwrap();

    let started = engine.started.lock().unwrap().clone();
    assert_eq!(started[1].name, MAIN);
    assert_eq!(started[1].env["DB_PASSWORD"], "local-dev");
}

#[tokio::test]
async fn test_pause_container_never_running() {
    let engine = Arc::new(FakeEngine {
        never_running: vec![PAUSE.to_string()],
        ..Default::default()
    });
    let mut opts = run_opts(
        run_vars(),
        FakeWorkspace::new().with_manifest("api", LBWS_MANIFEST),
        secrets(),
        engine.clone(),
    )
    .with_pause_timeout(Duration::from_millis(50));

    let err = tokio::time::timeout(Duration::from_secs(10), opts.execute())
        .await
        .expect("pause wait should time out")
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "wait for pause container: Timeout error: container phonetool-test-api-pause did not start within 50ms"
    );
    assert_eq!(engine.started_names(), vec![PAUSE]);
    assert_eq!(engine.stopped(), vec![PAUSE]);
}
