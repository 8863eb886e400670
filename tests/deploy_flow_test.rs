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
use std::sync::Arc;
use wharf::cli::action::ActionCommand;
use wharf::cli::deploy::{DeployOpts, DeployWkldVars};
use wharf::domain::flags::TriState;
use wharf::domain::model::{WorkloadCategory, WorkloadType};

struct Harness {
    store: Arc<FakeStore>,
    ws: Arc<FakeWorkspace>,
    prompt: Arc<FakePrompter>,
    sel: Arc<FakeSelector>,
    initializer: Arc<RecordingInitializer>,
    factory: Arc<FakeFactory>,
}

impl Harness {
    fn new(store: FakeStore, ws: FakeWorkspace, prompt: FakePrompter) -> Self {
        Self {
            store: Arc::new(store),
            ws: Arc::new(ws),
            prompt: Arc::new(prompt),
            sel: Arc::new(FakeSelector::new()),
            initializer: Arc::new(RecordingInitializer::default()),
            factory: Arc::new(FakeFactory::new()),
        }
    }

    fn with_factory(mut self, factory: FakeFactory) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    fn with_selector(mut self, sel: FakeSelector) -> Self {
        self.sel = Arc::new(sel);
        self
    }

    fn opts(&self, vars: DeployWkldVars) -> DeployOpts {
        DeployOpts::new(
            vars,
            self.store.clone(),
            self.ws.clone(),
            self.prompt.clone(),
            self.sel.clone(),
            self.initializer.clone(),
            self.factory.clone(),
        )
    }
}

fn vars(name: &str, env: &str) -> DeployWkldVars {
    DeployWkldVars {
        app: "phonetool".to_string(),
        name: name.to_string(),
        env_name: env.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_check_env_exists_sets_both_flags() {
    struct Case {
        in_app: bool,
        in_ws: bool,
    }
    let cases = [
        Case { in_app: true, in_ws: true },
        Case { in_app: true, in_ws: false },
        Case { in_app: false, in_ws: true },
        Case { in_app: false, in_ws: false },
    ];

    for case in cases {
        let mut store = FakeStore::new().with_app("phonetool");
        if case.in_app {
            store = store.with_env("phonetool", "test");
        }
        let mut ws = FakeWorkspace::new().with_app("phonetool");
        if case.in_ws {
            ws = ws.with_env("test");
        }
        let h = Harness::new(store, ws, FakePrompter::new());
        let mut opts = h.opts(vars("api", "test"));

        opts.check_env_exists().await.unwrap();
        assert_eq!(opts.env_exists_in_app(), case.in_app);
        assert_eq!(opts.env_exists_in_ws(), case.in_ws);
    }
}

#[tokio::test]
async fn test_check_env_exists_wraps_lookup_errors() {
    let store = FakeStore {
        get_environment_error: Some("some error".to_string()),
        ..FakeStore::new()
    };
    let h = Harness::new(store, FakeWorkspace::new(), FakePrompter::new());
    let mut opts = h.opts(vars("api", "test"));
    let err = opts.check_env_exists().await.unwrap_err();
    assert_eq!(err.to_string(), "get environment test: some error");

    let ws = FakeWorkspace {
        list_environments_error: Some("some error".to_string()),
        ..FakeWorkspace::new()
    };
    let h = Harness::new(FakeStore::new(), ws, FakePrompter::new());
    let mut opts = h.opts(vars("api", "test"));
    let err = opts.check_env_exists().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "retrieve environments from workspace: some error"
    );
}

#[tokio::test]
async fn test_maybe_init_env() {
    struct Case {
        name: &'static str,
        in_app: bool,
        in_ws: bool,
        init_env: TriState,
        deploy_env: TriState,
        prompter: FakePrompter,
        factory: FakeFactory,
        want_err: Option<&'static str>,
        want_log: Vec<&'static str>,
    }

    let cases = vec![
        Case {
            name: "missing everywhere",
            in_app: false,
            in_ws: false,
            init_env: TriState::Unset,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new(),
            want_err: Some(
                "environment test does not exist in the workspace or application phonetool",
            ),
            want_log: vec![],
        },
        Case {
            name: "already in app",
            in_app: true,
            in_ws: true,
            init_env: TriState::Unset,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new(),
            want_err: None,
            want_log: vec![],
        },
        Case {
            name: "declined by flag",
            in_app: false,
            in_ws: true,
            init_env: TriState::No,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new(),
            want_err: Some("environment test does not exist in application phonetool"),
            want_log: vec![],
        },
        Case {
            name: "declined at prompt",
            in_app: false,
            in_ws: true,
            init_env: TriState::Unset,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::confirming(&[false]),
            factory: FakeFactory::new(),
            want_err: Some("environment test does not exist in application phonetool"),
            want_log: vec![],
        },
        Case {
            name: "prompt fails",
            in_app: false,
            in_ws: true,
            init_env: TriState::Unset,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::failing_confirm("some error"),
            factory: FakeFactory::new(),
            want_err: Some("confirm environment initialization: some error"),
            want_log: vec![],
        },
        Case {
            name: "accepted at prompt",
            in_app: false,
            in_ws: true,
            init_env: TriState::Unset,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::confirming(&[true]),
            factory: FakeFactory::new(),
            want_err: None,
            want_log: vec!["validate env init", "ask env init", "execute env init"],
        },
        Case {
            name: "init validate fails",
            in_app: false,
            in_ws: true,
            init_env: TriState::Yes,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new().failing("validate", "env init", "some error"),
            want_err: Some("validate env init: some error"),
            want_log: vec!["validate env init"],
        },
        Case {
            name: "init ask fails",
            in_app: false,
            in_ws: true,
            init_env: TriState::Yes,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new().failing("ask", "env init", "some error"),
            want_err: Some("ask env init: some error"),
            want_log: vec!["validate env init", "ask env init"],
        },
        Case {
            name: "init execute fails",
            in_app: false,
            in_ws: true,
            init_env: TriState::Yes,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new().failing("execute", "env init", "some error"),
            want_err: Some("execute env init: some error"),
            want_log: vec!["validate env init", "ask env init", "execute env init"],
        },
        Case {
            name: "initialized but deployment declined",
            in_app: false,
            in_ws: true,
            init_env: TriState::Yes,
            deploy_env: TriState::No,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new(),
            want_err: Some("environment test was initialized but has not been deployed"),
            want_log: vec!["validate env init", "ask env init", "execute env init"],
        },
    ];

    for case in cases {
        let mut store = FakeStore::new().with_app("phonetool");
        if case.in_app {
            store = store.with_env("phonetool", "test");
        }
        let mut ws = FakeWorkspace::new().with_app("phonetool");
        if case.in_ws {
            ws = ws.with_env("test");
        }
        let h = Harness::new(store, ws, case.prompter).with_factory(case.factory);
        let mut opts = h.opts(DeployWkldVars {
            init_env: case.init_env,
            deploy_env: case.deploy_env,
            ..vars("api", "test")
        });

        opts.check_env_exists().await.unwrap();
        let result = opts.maybe_init_env().await;
        match case.want_err {
            Some(want) => assert_eq!(
                result.unwrap_err().to_string(),
                want,
                "case {:?}",
                case.name
            ),
            None => assert!(result.is_ok(), "case {:?}: {:?}", case.name, result),
        }
        assert_eq!(h.factory.log(), case.want_log, "case {:?}", case.name);
    }
}

#[tokio::test]
async fn test_maybe_init_env_marks_env_registered_and_passes_names() {
    let store = FakeStore::new().with_app("phonetool");
    let ws = FakeWorkspace::new().with_app("phonetool").with_env("test");
    let h = Harness::new(store, ws, FakePrompter::new());
    let mut opts = h.opts(DeployWkldVars {
        init_env: TriState::Yes,
        ..vars("api", "test")
    });

    opts.check_env_exists().await.unwrap();
    assert!(!opts.env_exists_in_app());
    opts.maybe_init_env().await.unwrap();
    assert!(opts.env_exists_in_app());

    let init_vars = h.factory.init_env_vars.lock().unwrap().clone();
    assert_eq!(init_vars.len(), 1);
    assert_eq!(init_vars[0].app, "phonetool");
    assert_eq!(init_vars[0].name, "test");
}

#[tokio::test]
async fn test_maybe_deploy_env() {
    struct Case {
        name: &'static str,
        in_ws: bool,
        deploy_env: TriState,
        prompter: FakePrompter,
        factory: FakeFactory,
        want_err: Option<&'static str>,
        want_log: Vec<&'static str>,
    }

    let cases = vec![
        Case {
            name: "not in workspace",
            in_ws: false,
            deploy_env: TriState::Yes,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new(),
            want_err: None,
            want_log: vec![],
        },
        Case {
            name: "declined by flag",
            in_ws: true,
            deploy_env: TriState::No,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new(),
            want_err: None,
            want_log: vec![],
        },
        Case {
            name: "declined at prompt",
            in_ws: true,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::confirming(&[false]),
            factory: FakeFactory::new(),
            want_err: None,
            want_log: vec![],
        },
        Case {
            name: "prompt fails",
            in_ws: true,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::failing_confirm("some error"),
            factory: FakeFactory::new(),
            want_err: Some("confirm environment deployment: some error"),
            want_log: vec![],
        },
        Case {
            name: "deployed",
            in_ws: true,
            deploy_env: TriState::Yes,
            prompter: FakePrompter::new(),
            factory: FakeFactory::new(),
            want_err: None,
            want_log: vec!["validate env deploy", "ask env deploy", "execute env deploy"],
        },
        Case {
            name: "deploy execute fails",
            in_ws: true,
            deploy_env: TriState::Unset,
            prompter: FakePrompter::confirming(&[true]),
            factory: FakeFactory::new().failing("execute", "env deploy", "some error"),
            want_err: Some("execute env deploy: some error"),
            want_log: vec!["validate env deploy", "ask env deploy", "execute env deploy"],
        },
    ];

    for case in cases {
        let store = FakeStore::new()
            .with_app("phonetool")
            .with_env("phonetool", "test");
        let mut ws = FakeWorkspace::new().with_app("phonetool");
        if case.in_ws {
            ws = ws.with_env("test");
        }
        let h = Harness::new(store, ws, case.prompter).with_factory(case.factory);
        let mut opts = h.opts(DeployWkldVars {
            deploy_env: case.deploy_env,
            ..vars("api", "test")
        });

        opts.check_env_exists().await.unwrap();
        let result = opts.maybe_deploy_env().await;
        match case.want_err {
            Some(want) => assert_eq!(
                result.unwrap_err().to_string(),
                want,
                "case {:?}",
                case.name
            ),
            None => assert!(result.is_ok(), "case {:?}: {:?}", case.name, result),
        }
        assert_eq!(h.factory.log(), case.want_log, "case {:?}", case.name);
    }
}

#[tokio::test]
async fn test_resolve_workload_uses_registered_type() {
    let store = FakeStore::new()
        .with_app("phonetool")
        .with_workload("phonetool", "report", WorkloadType::ScheduledJob);
    let h = Harness::new(store, FakeWorkspace::new(), FakePrompter::new());
    let mut opts = h.opts(vars("report", ""));

    let wl_type = opts.resolve_workload().await.unwrap();
    assert_eq!(wl_type, WorkloadType::ScheduledJob);
    assert_eq!(opts.workload_type(), Some(WorkloadType::ScheduledJob));
    assert!(h.initializer.calls().is_empty());
    assert!(h.prompt.asked().is_empty());
}

#[tokio::test]
async fn test_resolve_workload_refuses_when_init_disabled() {
    let store = FakeStore::new().with_app("phonetool");
    let ws = FakeWorkspace::new().with_manifest("api", LBWS_MANIFEST);
    let h = Harness::new(store, ws, FakePrompter::new());
    let mut opts = h.opts(DeployWkldVars {
        init_wkld: TriState::No,
        ..vars("api", "")
    });

    let err = opts.resolve_workload().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "workload api is uninitialized but --init-wkld=false was specified"
    );
    assert!(h.initializer.calls().is_empty());
}

#[tokio::test]
async fn test_resolve_workload_initializes_with_manifest_type() {
    struct Case {
        name: &'static str,
        init_wkld: TriState,
        prompter: FakePrompter,
        want_err: Option<&'static str>,
        want_init: bool,
    }

    let cases = vec![
        Case {
            name: "flag set",
            init_wkld: TriState::Yes,
            prompter: FakePrompter::new(),
            want_err: None,
            want_init: true,
        },
        Case {
            name: "accepted at prompt",
            init_wkld: TriState::Unset,
            prompter: FakePrompter::confirming(&[true]),
            want_err: None,
            want_init: true,
        },
        Case {
            name: "declined at prompt",
            init_wkld: TriState::Unset,
            prompter: FakePrompter::confirming(&[false]),
            want_err: Some("workload api must be initialized before it can be deployed"),
            want_init: false,
        },
        Case {
            name: "prompt fails",
            init_wkld: TriState::Unset,
            prompter: FakePrompter::failing_confirm("some error"),
            want_err: Some("confirm workload initialization: some error"),
            want_init: false,
        },
    ];

    for case in cases {
        let store = FakeStore::new().with_app("phonetool");
        let ws = FakeWorkspace::new().with_manifest("api", LBWS_MANIFEST);
        let h = Harness::new(store, ws, case.prompter);
        let mut opts = h.opts(DeployWkldVars {
            init_wkld: case.init_wkld,
            ..vars("api", "")
        });

        let result = opts.resolve_workload().await;
        match case.want_err {
            Some(want) => assert_eq!(
                result.unwrap_err().to_string(),
                want,
                "case {:?}",
                case.name
            ),
            None => assert_eq!(
                result.unwrap(),
                WorkloadType::LoadBalancedWebService,
                "case {:?}",
                case.name
            ),
        }
        let calls = h.initializer.calls();
        if case.want_init {
            assert_eq!(
                calls,
                vec![(
                    "phonetool".to_string(),
                    "api".to_string(),
                    WorkloadType::LoadBalancedWebService
                )],
                "case {:?}",
                case.name
            );
        } else {
            assert!(calls.is_empty(), "case {:?}", case.name);
        }
    }
}

#[tokio::test]
async fn test_resolve_workload_error_wrapping() {
    let store = FakeStore {
        list_workloads_error: Some("some error".to_string()),
        ..FakeStore::new()
    };
    let h = Harness::new(store, FakeWorkspace::new(), FakePrompter::new());
    let mut opts = h.opts(vars("api", ""));
    let err = opts.resolve_workload().await.unwrap_err();
    assert_eq!(err.to_string(), "retrieve workloads: some error");

    let h = Harness::new(FakeStore::new(), FakeWorkspace::new(), FakePrompter::new());
    let mut opts = h.opts(vars("api", ""));
    let err = opts.resolve_workload().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "read manifest for workload api: no manifest for api"
    );

    let ws = FakeWorkspace::new().with_manifest("api", "name: api\ntype: Static Site\n");
    let h = Harness::new(FakeStore::new(), ws, FakePrompter::new());
    let mut opts = h.opts(DeployWkldVars {
        init_wkld: TriState::Yes,
        ..vars("api", "")
    });
    let err = opts.resolve_workload().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "unrecognized workload type \"Static Site\" in manifest for workload api"
    );

    let h = Harness::new(
        FakeStore::new(),
        FakeWorkspace::new().with_manifest("api", LBWS_MANIFEST),
        FakePrompter::new(),
    );
    let h = Harness {
        initializer: Arc::new(RecordingInitializer {
            error: Some("some error".to_string()),
            ..Default::default()
        }),
        ..h
    };
    let mut opts = h.opts(DeployWkldVars {
        init_wkld: TriState::Yes,
        ..vars("api", "")
    });
    let err = opts.resolve_workload().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "add workload api to application phonetool: some error"
    );
}

#[tokio::test]
async fn test_delegation_errors_are_prefixed_by_category() {
    struct Case {
        workload: &'static str,
        wl_type: WorkloadType,
        step: &'static str,
        label: &'static str,
        want: &'static str,
    }

    let cases = [
        Case {
            workload: "api",
            wl_type: WorkloadType::BackendService,
            step: "ask",
            label: "svc deploy",
            want: "ask svc deploy: some error",
        },
        Case {
            workload: "report",
            wl_type: WorkloadType::ScheduledJob,
            step: "ask",
            label: "job deploy",
            want: "ask job deploy: some error",
        },
        Case {
            workload: "api",
            wl_type: WorkloadType::WorkerService,
            step: "validate",
            label: "svc deploy",
            want: "validate svc deploy: some error",
        },
        Case {
            workload: "report",
            wl_type: WorkloadType::ScheduledJob,
            step: "execute",
            label: "job deploy",
            want: "execute job deploy: some error",
        },
        Case {
            workload: "api",
            wl_type: WorkloadType::LoadBalancedWebService,
            step: "recommend",
            label: "svc deploy",
            want: "recommend actions: some error",
        },
    ];

    for case in cases {
        let store = FakeStore::new()
            .with_app("phonetool")
            .with_workload("phonetool", case.workload, case.wl_type);
        let h = Harness::new(store, FakeWorkspace::new(), FakePrompter::new())
            .with_factory(FakeFactory::new().failing(case.step, case.label, "some error"));
        let mut opts = h.opts(vars(case.workload, ""));

        let err = opts.execute().await.unwrap_err();
        assert_eq!(err.to_string(), case.want);
    }
}

#[tokio::test]
async fn test_execute_runs_every_step_in_order() {
    let store = FakeStore::new().with_app("phonetool");
    let ws = FakeWorkspace::new()
        .with_app("phonetool")
        .with_env("test")
        .with_manifest("api", LBWS_MANIFEST);
    let factory = FakeFactory {
        recommendations: vec!["Run `wharf svc status --name api`".to_string()],
        ..FakeFactory::new()
    };
    let h = Harness::new(store, ws, FakePrompter::confirming(&[true, true, true]))
        .with_factory(factory);
    let mut opts = h.opts(DeployWkldVars {
        detach: true,
        ..vars("api", "test")
    });

    opts.validate().await.unwrap();
    opts.ask().await.unwrap();
    opts.execute().await.unwrap();

    assert_eq!(
        h.factory.log(),
        vec![
            "validate env init",
            "ask env init",
            "execute env init",
            "validate env deploy",
            "ask env deploy",
            "execute env deploy",
            "ask svc deploy",
            "validate svc deploy",
            "execute svc deploy",
            "recommend svc deploy",
        ]
    );
    assert_eq!(
        h.prompt.asked(),
        vec![
            "Environment test does not exist in app phonetool. Initialize it?",
            "Deploy environment test?",
            "Workload api does not exist in app phonetool. Initialize it?",
        ]
    );
    assert_eq!(
        opts.recommend_actions().unwrap(),
        vec!["Run `wharf svc status --name api`".to_string()]
    );

    let delegated = h.factory.deploy_vars.lock().unwrap().clone();
    assert_eq!(delegated.len(), 1);
    assert_eq!(delegated[0].0, WorkloadCategory::Service);
    assert_eq!(delegated[0].1.name, "api");
    assert_eq!(delegated[0].1.env_name, "test");
    assert!(delegated[0].1.detach);
}

#[tokio::test]
async fn test_execute_without_env_skips_environment_steps() {
    let store = FakeStore::new()
        .with_app("phonetool")
        .with_workload("phonetool", "report", WorkloadType::ScheduledJob);
    let h = Harness::new(store, FakeWorkspace::new(), FakePrompter::new());
    let mut opts = h.opts(vars("report", ""));

    opts.execute().await.unwrap();

    assert!(h
        .store
        .calls()
        .iter()
        .all(|c| !c.starts_with("get_environment")));
    assert_eq!(
        h.factory.log(),
        vec![
            "ask job deploy",
            "validate job deploy",
            "execute job deploy",
            "recommend job deploy",
        ]
    );
}

#[tokio::test]
async fn test_empty_name_is_selected_from_workspace() {
    let store = FakeStore::new()
        .with_app("phonetool")
        .with_workload("phonetool", "api", WorkloadType::BackendService);
    let sel = FakeSelector {
        workload: Some("api".to_string()),
        ..FakeSelector::new()
    };
    let h = Harness::new(store, FakeWorkspace::new(), FakePrompter::new()).with_selector(sel);
    let mut opts = h.opts(vars("", ""));

    opts.ask().await.unwrap();
    assert_eq!(opts.vars.name, "api");
    opts.execute().await.unwrap();
    assert_eq!(h.sel.calls(), vec!["workload"]);

    let sel = FakeSelector {
        error: Some("some error".to_string()),
        ..FakeSelector::new()
    };
    let h = Harness::new(FakeStore::new(), FakeWorkspace::new(), FakePrompter::new())
        .with_selector(sel);
    let mut opts = h.opts(vars("", ""));
    let err = opts.execute().await.unwrap_err();
    assert_eq!(err.to_string(), "select workload: some error");
}

#[tokio::test]
async fn test_validate_rejects_bad_names() {
    let h = Harness::new(FakeStore::new(), FakeWorkspace::new(), FakePrompter::new());
    let mut opts = h.opts(vars("Not_Valid", ""));
    assert!(opts.validate().await.is_err());

    let mut opts = h.opts(vars("api", "Bad Env"));
    assert!(opts.validate().await.is_err());

    let mut opts = h.opts(vars("", ""));
    assert!(opts.validate().await.is_ok());
}
