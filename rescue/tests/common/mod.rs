//! Scripted stand-ins for the terminal, the shell, the recovery tool and the
//! machine itself.

#![allow(dead_code)]

use async_trait::async_trait;
use rescue::console::Console;
use rescue::recovery::RecoveryTool;
use rescue::setup::{SetupUnit, UnitEnvironment, UnitRunner, UnitStatus};
use rescue::system::SystemControl;
use rescue::{BootServices, RescueLayout, RescueResult};
use std::collections::VecDeque;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct ScriptedConsole {
    input: Mutex<VecDeque<String>>,
    output: Mutex<Vec<String>>,
    key_prompts: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    pub fn with_input(lines: &[&str]) -> Self {
        Self {
            input: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn output(&self) -> Vec<String> {
        self.output.lock().unwrap().clone()
    }

    pub fn printed(&self, line: &str) -> bool {
        self.output().iter().any(|l| l == line)
    }

    pub fn key_prompts(&self) -> Vec<String> {
        self.key_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    fn write_line(&self, line: &str) -> RescueResult<()> {
        self.output.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn write(&self, text: &str) -> RescueResult<()> {
        self.write_line(text)
    }

    async fn read_line(&self, prompt: &str) -> RescueResult<Option<String>> {
        self.write_line(prompt)?;
        Ok(self.input.lock().unwrap().pop_front())
    }

    async fn wait_for_key(&self, prompt: &str) -> RescueResult<()> {
        self.key_prompts.lock().unwrap().push(prompt.to_string());
        Ok(())
    }
}

/// Records which units ran, whether traced, and what they saw of `SITE_NAME`.
#[derive(Default)]
pub struct FakeRunner {
    runs: Mutex<Vec<(String, bool)>>,
    seen_site: Mutex<Vec<Option<String>>>,
    fail: Vec<String>,
}

impl FakeRunner {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            fail: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn runs(&self) -> Vec<(String, bool)> {
        self.runs.lock().unwrap().clone()
    }

    pub fn seen_site(&self) -> Vec<Option<String>> {
        self.seen_site.lock().unwrap().clone()
    }
}

#[async_trait]
impl UnitRunner for FakeRunner {
    async fn run(
        &self,
        unit: &SetupUnit,
        env: &mut UnitEnvironment,
        trace: bool,
    ) -> RescueResult<UnitStatus> {
        self.runs
            .lock()
            .unwrap()
            .push((unit.name().to_string(), trace));
        self.seen_site
            .lock()
            .unwrap()
            .push(env.get("SITE_NAME").map(str::to_string));
        env.set(format!("UNIT_{}", self.runs.lock().unwrap().len()), unit.name());

        if self.fail.iter().any(|n| n == unit.name()) {
            Ok(UnitStatus::Failed(Some(1)))
        } else {
            Ok(UnitStatus::Succeeded)
        }
    }
}

pub struct FakeTool {
    succeed: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeTool {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecoveryTool for FakeTool {
    async fn run(&self, args: &[String], _env: &UnitEnvironment) -> RescueResult<bool> {
        self.calls.lock().unwrap().push(args.to_vec());
        Ok(self.succeed)
    }

    fn name(&self) -> &str {
        "rear"
    }
}

#[derive(Default)]
pub struct FakeSystem {
    reboots: Mutex<usize>,
    shells: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FakeSystem {
    pub fn reboots(&self) -> usize {
        *self.reboots.lock().unwrap()
    }

    pub fn shells(&self) -> Vec<(PathBuf, PathBuf)> {
        self.shells.lock().unwrap().clone()
    }
}

#[async_trait]
impl SystemControl for FakeSystem {
    async fn reboot(&self) -> RescueResult<()> {
        *self.reboots.lock().unwrap() += 1;
        Ok(())
    }

    fn spawn_debug_shell(&self, shell: &Path, tty: &Path) -> RescueResult<()> {
        self.shells
            .lock()
            .unwrap()
            .push((shell.to_path_buf(), tty.to_path_buf()));
        Ok(())
    }
}

/// Handles on every fake so tests can inspect them after the boot.
pub struct Fakes {
    pub console: Arc<ScriptedConsole>,
    pub runner: Arc<FakeRunner>,
    pub tool: Arc<FakeTool>,
    pub system: Arc<FakeSystem>,
}

impl Fakes {
    pub fn new(console: ScriptedConsole, runner: FakeRunner, tool: FakeTool) -> Self {
        Self {
            console: Arc::new(console),
            runner: Arc::new(runner),
            tool: Arc::new(tool),
            system: Arc::new(FakeSystem::default()),
        }
    }

    pub fn services(&self) -> BootServices {
        BootServices {
            console: self.console.clone(),
            unit_runner: self.runner.clone(),
            recovery_tool: self.tool.clone(),
            system: self.system.clone(),
        }
    }
}

/// Create executable setup units in the layout's setup directory.
pub fn install_units(layout: &RescueLayout, names: &[&str]) {
    let dir = layout.setup_dir();
    std::fs::create_dir_all(&dir).unwrap();
    for name in names {
        let path = dir.join(name);
        std::fs::write(&path, "true\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

pub fn write_file(layout: &RescueLayout, relative: &str, content: &str) -> PathBuf {
    let path = layout.resolve(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

pub fn base_env() -> UnitEnvironment {
    let mut env = UnitEnvironment::new();
    env.set("PATH", "/usr/sbin:/usr/bin:/sbin:/bin");
    env
}
