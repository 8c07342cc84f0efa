//! TUI application state

use crate::activity::ActivityLog;
use crate::bundle::{
    spawn_generation, BundleFile, BundleGenerator, GenerationResult, GenerationSlot,
};
use crate::storage::Storage;
use crate::tui::keypad::HostCommand;
use cardputer_sim::{Control, Input, KeyAction, Mode, Session, VehicleProfile};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Main application state
pub struct App {
    /// Simulator state (ECU, screen, key map, profiles)
    pub session: Session,
    /// Where the key map and profiles persist
    pub storage: Storage,
    /// Rolling on-screen log
    pub activity: ActivityLog,
    /// Latest bundle and the in-flight guard
    pub generation: GenerationSlot,
    /// Bundle exporter's visible file
    pub export_tab: BundleFile,
    /// Directory bundles are exported into
    pub export_dir: PathBuf,
    /// Hardware named in the generation prompt
    pub target: String,
    /// Last keypad key pressed (highlighted on the virtual keyboard)
    pub last_key: Option<String>,
    /// Show help overlay
    pub show_help: bool,
    /// Should quit
    pub should_quit: bool,
    generator: Arc<dyn BundleGenerator>,
    results: mpsc::UnboundedSender<GenerationResult>,
}

impl App {
    /// Create the app. Generation results are delivered on `results`; the
    /// caller feeds them back through [`App::finish_generation`].
    pub fn new(
        session: Session,
        storage: Storage,
        generator: Arc<dyn BundleGenerator>,
        results: mpsc::UnboundedSender<GenerationResult>,
        target: String,
        export_dir: PathBuf,
    ) -> Self {
        let mut activity = ActivityLog::new();
        activity.push("[SYS] Firmware simulation active.");

        Self {
            session,
            storage,
            activity,
            generation: GenerationSlot::default(),
            export_tab: BundleFile::Firmware,
            export_dir,
            target,
            last_key: None,
            show_help: false,
            should_quit: false,
            generator,
            results,
        }
    }

    /// Act on one translated host key
    pub fn handle_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::Keypad(key) => self.press_key(key),
            HostCommand::ToggleHelp => self.show_help = !self.show_help,
            HostCommand::SaveProfile => self.save_profile(),
            HostCommand::LoadSelectedProfile => self.load_selected_profile(),
            HostCommand::CycleBinding => self.cycle_selected_binding(),
            HostCommand::Generate => {
                self.begin_generation();
            }
            HostCommand::NextExportTab => self.export_tab = self.export_tab.next(),
            HostCommand::Export => self.export_bundle(),
            HostCommand::MoveSelection(delta) => {
                self.session.handle(&Input::MoveSelection(delta));
            }
            HostCommand::Nudge(steps) => self.nudge_selected_control(steps),
            HostCommand::Quit => self.should_quit = true,
        }
    }

    /// Press a virtual keypad key
    pub fn press_key(&mut self, key: &str) {
        let before = (
            self.session.modes.current(),
            self.session.ecu.mil,
            self.session.ecu.ble_enabled,
        );

        self.session.handle(&Input::key(key));
        self.last_key = Some(key.to_string());

        let ecu = &self.session.ecu;
        if self.session.modes.current() != before.0 {
            debug!("Screen {} -> {}", before.0, self.session.modes.current());
        }
        if ecu.mil != before.1 {
            if ecu.mil {
                self.activity.push(format!("[ECU] MIL on, DTC {}", ecu.dtc));
            } else {
                self.activity.push("[ECU] MIL cleared");
            }
        }
        if ecu.ble_enabled != before.2 {
            let state = if ecu.ble_enabled { "enabled" } else { "disabled" };
            self.activity.push(format!("[BLE] Radio {state}"));
        }
    }

    /// Dashboard field under the selection, if the dashboard is showing
    pub fn selected_control(&self) -> Option<Control> {
        if self.session.modes.current() != Mode::Dashboard {
            return None;
        }
        Control::from_index(self.session.modes.selected_index())
    }

    /// Move the selected dashboard field by whole slider steps
    pub fn nudge_selected_control(&mut self, steps: i32) {
        if let Some(control) = self.selected_control() {
            self.session.handle(&Input::NudgeControl(control, steps));
        }
    }

    /// Profile under the selection on the SD manager screen
    pub fn selected_profile(&self) -> Option<&VehicleProfile> {
        if self.session.modes.current() != Mode::SdManager {
            return None;
        }
        self.session.profiles.get(self.session.modes.selected_index())
    }

    /// Key-mapper row under the selection
    pub fn selected_binding(&self) -> Option<(String, KeyAction)> {
        if self.session.modes.current() != Mode::KeyMapper {
            return None;
        }
        self.session
            .keymap
            .iter()
            .nth(self.session.modes.selected_index())
            .map(|(key, action)| (key.to_string(), action))
    }

    /// Archive the current state and persist the profile list
    pub fn save_profile(&mut self) {
        let Some(name) = self
            .session
            .handle(&Input::SaveProfile)
            .map(VehicleProfile::file_name)
        else {
            return;
        };

        match self.storage.save_profiles(&self.session.profiles) {
            Ok(()) => self.activity.push(format!("SD: File {name} created.")),
            Err(e) => self.activity.push(format!("SD: Write failed: {e}")),
        }
    }

    /// Load the profile under the SD manager selection
    pub fn load_selected_profile(&mut self) {
        let Some(profile) = self.selected_profile().cloned() else {
            self.activity.push("SD: Select a file on the SD card screen first");
            return;
        };
        self.session.handle(&Input::LoadProfile(profile.clone()));
        self.activity.push(format!("SD: Loaded {}", profile.name));
    }

    /// Rebind the selected key-mapper row to the next action and persist
    pub fn cycle_selected_binding(&mut self) {
        let Some((key, action)) = self.selected_binding() else {
            return;
        };
        let next = next_action(action);
        self.session.keymap.bind(key.clone(), next);

        match self.storage.save_keymap(&self.session.keymap) {
            Ok(()) => self.activity.push(format!("[KEY] {key} -> {next}")),
            Err(e) => self.activity.push(format!("[KEY] Save failed: {e}")),
        }
    }

    /// Start a bundle generation unless one is already running
    pub fn begin_generation(&mut self) -> bool {
        if !self.generation.try_begin() {
            self.activity.push("[GEN] Generation already in progress");
            return false;
        }
        self.activity.push("[GEN] Preparing CI/CD build bundle...");
        spawn_generation(
            Arc::clone(&self.generator),
            self.target.clone(),
            self.results.clone(),
        );
        true
    }

    /// Install a finished generation result
    pub fn finish_generation(&mut self, result: GenerationResult) {
        match self.generation.settle(result) {
            Ok(_) => {
                self.export_tab = BundleFile::Firmware;
                self.activity.push("[GEN] GitHub Actions bundle ready to export.");
            }
            Err(e) => self.activity.push(format!("[GEN] Generation error: {e}")),
        }
    }

    /// Write the held bundle into the export directory
    pub fn export_bundle(&mut self) {
        let Some(bundle) = self.generation.bundle() else {
            self.activity.push("[GEN] Nothing to export yet (F5 generates)");
            return;
        };
        match bundle.write_to(&self.export_dir) {
            Ok(files) => self.activity.push(format!(
                "[GEN] Exported {} files to {}",
                files.len(),
                self.export_dir.display()
            )),
            Err(e) => self.activity.push(format!("[GEN] Export failed: {e}")),
        }
    }
}

/// Following action in declaration order, wrapping
fn next_action(action: KeyAction) -> KeyAction {
    let all = KeyAction::ALL;
    let index = all.iter().position(|a| *a == action).unwrap_or(0);
    all[(index + 1) % all.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{ApiError, ProjectBundle};
    use async_trait::async_trait;
    use cardputer_sim::{KeyMapping, ProfileStore, DTC_MISFIRE};
    use std::time::Duration;

    struct FixedGenerator(Result<ProjectBundle, String>);

    #[async_trait]
    impl BundleGenerator for FixedGenerator {
        async fn generate(&self, _target: &str) -> Result<ProjectBundle, ApiError> {
            self.0.clone().map_err(ApiError::Request)
        }
    }

    struct PanickingGenerator;

    #[async_trait]
    impl BundleGenerator for PanickingGenerator {
        async fn generate(&self, _target: &str) -> Result<ProjectBundle, ApiError> {
            panic!("generator blew up");
        }
    }

    fn bundle(tag: &str) -> ProjectBundle {
        ProjectBundle {
            ino: format!("// {tag}"),
            platformio: "[env]".to_string(),
            workflow: "name: build".to_string(),
        }
    }

    fn app_with(
        dir: &std::path::Path,
        generator: Arc<dyn BundleGenerator>,
    ) -> (App, mpsc::UnboundedReceiver<GenerationResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(KeyMapping::default(), ProfileStore::new());
        let app = App::new(
            session,
            Storage::new(dir.join("data")),
            generator,
            tx,
            "test target".to_string(),
            dir.join("export"),
        );
        (app, rx)
    }

    async fn next_result(rx: &mut mpsc::UnboundedReceiver<GenerationResult>) -> GenerationResult {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("generation result timed out")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_startup_log() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _rx) = app_with(dir.path(), Arc::new(FixedGenerator(Ok(bundle("a")))));
        assert!(app
            .activity
            .latest()
            .unwrap()
            .ends_with("[SYS] Firmware simulation active."));
    }

    #[tokio::test]
    async fn test_save_profile_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_with(dir.path(), Arc::new(FixedGenerator(Ok(bundle("a")))));
        app.press_key("ENT");
        app.save_profile();

        assert_eq!(app.session.profiles.len(), 1);
        let stored = app.storage.load_profiles();
        assert_eq!(stored, app.session.profiles);
        assert!(app.activity.latest().unwrap().contains("SD: File LOG_"));
    }

    #[tokio::test]
    async fn test_load_selected_profile() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_with(dir.path(), Arc::new(FixedGenerator(Ok(bundle("a")))));
        app.press_key("ENT");
        app.save_profile();
        app.press_key("ENT");
        assert!(!app.session.ecu.mil);

        // Outside the SD manager nothing is selected
        app.load_selected_profile();
        assert!(!app.session.ecu.mil);

        app.session.modes.set_mode(Mode::SdManager);
        app.load_selected_profile();
        assert!(app.session.ecu.mil);
        assert_eq!(app.session.ecu.dtc, DTC_MISFIRE);
    }

    #[tokio::test]
    async fn test_nudge_selected_control() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_with(dir.path(), Arc::new(FixedGenerator(Ok(bundle("a")))));
        app.handle_command(HostCommand::MoveSelection(2));
        assert_eq!(app.selected_control(), Some(Control::Temperature));
        app.handle_command(HostCommand::Nudge(3));
        assert_eq!(app.session.ecu.temperature, 88);
    }

    #[tokio::test]
    async fn test_cycle_binding_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_with(dir.path(), Arc::new(FixedGenerator(Ok(bundle("a")))));
        app.session.modes.set_mode(Mode::KeyMapper);
        let (key, action) = app.selected_binding().unwrap();

        app.cycle_selected_binding();
        let rebound = app.session.keymap.get(&key).unwrap();
        assert_ne!(rebound, action);
        assert_eq!(app.storage.load_keymap(), app.session.keymap);
    }

    #[tokio::test]
    async fn test_generation_success() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut rx) = app_with(dir.path(), Arc::new(FixedGenerator(Ok(bundle("a")))));
        assert!(app.begin_generation());
        assert!(app.generation.in_flight());

        let result = next_result(&mut rx).await;
        app.finish_generation(result);
        assert!(!app.generation.in_flight());
        assert_eq!(app.generation.bundle(), Some(&bundle("a")));

        app.export_bundle();
        assert!(dir.path().join("export/platformio.ini").exists());
    }

    #[tokio::test]
    async fn test_second_request_rejected_while_pending() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut rx) = app_with(dir.path(), Arc::new(FixedGenerator(Ok(bundle("a")))));
        assert!(app.begin_generation());
        assert!(!app.begin_generation());
        assert!(app.activity.latest().unwrap().contains("already in progress"));

        let result = next_result(&mut rx).await;
        app.finish_generation(result);
        assert!(tokio::time::timeout(Duration::from_millis(100), rx.recv())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_with(dir.path(), Arc::new(FixedGenerator(Ok(bundle("a")))));
        assert!(app.generation.try_begin());
        app.finish_generation(Ok(bundle("first")));

        let (tx, mut rx) = mpsc::unbounded_channel();
        app.results = tx;
        app.generator = Arc::new(FixedGenerator(Err("offline".to_string())));
        assert!(app.begin_generation());
        let result = next_result(&mut rx).await;
        app.finish_generation(result);

        assert!(!app.generation.in_flight());
        assert_eq!(app.generation.bundle(), Some(&bundle("first")));
        assert!(app.activity.latest().unwrap().contains("Generation error"));
    }

    #[tokio::test]
    async fn test_panicking_generator_clears_flag() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mut rx) = app_with(dir.path(), Arc::new(PanickingGenerator));
        assert!(app.begin_generation());

        let result = next_result(&mut rx).await;
        assert!(matches!(result, Err(ApiError::TaskFailed(_))));
        app.finish_generation(result);
        assert!(!app.generation.in_flight());
        assert!(app.generation.bundle().is_none());
    }

    #[tokio::test]
    async fn test_export_without_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_with(dir.path(), Arc::new(FixedGenerator(Ok(bundle("a")))));
        app.export_bundle();
        assert!(!dir.path().join("export").exists());
        assert!(app.activity.latest().unwrap().contains("Nothing to export"));
    }
}
