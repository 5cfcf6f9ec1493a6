//! Behavioural tests for the daemon bootstrap sequence.

use std::cell::RefCell;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};

use super::support::{
    FailingConfigLoader, HealthEvent, RecordingHealthReporter, TestConfigLoader,
};

struct BootstrapWorld {
    loader: Box<dyn ConfigLoader>,
    socket_dir: Option<camino::Utf8PathBuf>,
    reporter: Arc<RecordingHealthReporter>,
    outcome: Option<Result<Daemon, BootstrapError>>,
}

impl BootstrapWorld {
    fn new() -> Self {
        Self {
            loader: Box::new(FailingConfigLoader),
            socket_dir: None,
            reporter: Arc::new(RecordingHealthReporter::default()),
            outcome: None,
        }
    }

    fn use_loader(&mut self, loader: TestConfigLoader) {
        self.socket_dir = loader.socket_path().parent().map(ToOwned::to_owned);
        self.loader = Box::new(loader);
    }

    fn bootstrap(&mut self) {
        let reporter = Arc::clone(&self.reporter);
        self.outcome = Some(bootstrap_with(&*self.loader, reporter));
    }

    fn outcome(&self) -> &Result<Daemon, BootstrapError> {
        self.outcome.as_ref().expect("bootstrap has not run")
    }

    fn recorded_failure(&self) -> bool {
        self.reporter
            .events()
            .iter()
            .any(|event| matches!(event, HealthEvent::BootstrapFailed(_)))
    }
}

#[fixture]
fn world() -> RefCell<BootstrapWorld> {
    RefCell::new(BootstrapWorld::new())
}

#[given("a healthy configuration loader")]
fn given_healthy_loader(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().use_loader(TestConfigLoader::new());
}

#[given("a failing configuration loader")]
fn given_failing_loader(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().loader = Box::new(FailingConfigLoader);
}

#[given("a configuration loader whose socket directory is a regular file")]
fn given_blocked_loader(world: &RefCell<BootstrapWorld>) {
    let loader = TestConfigLoader::with_relative_socket("blocker/gardend.sock");
    std::fs::write(loader.root().join("blocker"), b"").expect("write blocking file");
    world.borrow_mut().use_loader(loader);
}

#[when("the daemon bootstrap runs")]
fn when_bootstrap_runs(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().bootstrap();
}

#[then("bootstrap succeeds")]
fn then_bootstrap_succeeds(world: &RefCell<BootstrapWorld>) {
    let world = world.borrow();
    if let Err(error) = world.outcome() {
        panic!("bootstrap failed: {error}");
    }
}

#[then("bootstrap fails")]
fn then_bootstrap_fails(world: &RefCell<BootstrapWorld>) {
    assert!(
        world.borrow().outcome().is_err(),
        "bootstrap succeeded unexpectedly"
    );
}

#[then("the socket directory exists")]
fn then_socket_directory_exists(world: &RefCell<BootstrapWorld>) {
    let world = world.borrow();
    let dir = world.socket_dir.as_ref().expect("socket directory known");
    assert!(dir.is_dir(), "{dir} should have been created");
}

#[then("the health reporter recorded a successful bootstrap")]
fn then_recorded_success(world: &RefCell<BootstrapWorld>) {
    let events = world.borrow().reporter.events();
    assert_eq!(
        events,
        vec![HealthEvent::BootstrapStarting, HealthEvent::BootstrapSucceeded]
    );
}

#[then("the health reporter recorded a failed bootstrap")]
fn then_recorded_failure(world: &RefCell<BootstrapWorld>) {
    assert!(
        world.borrow().recorded_failure(),
        "events: {:?}",
        world.borrow().reporter.events()
    );
}

#[scenario(path = "tests/features/daemon_bootstrap.feature")]
fn daemon_bootstrap(#[from(world)] world: RefCell<BootstrapWorld>) {
    drop(world);
}
