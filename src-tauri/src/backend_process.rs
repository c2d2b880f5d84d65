use std::{
    fs,
    io::{BufRead, BufReader, Read},
    process::{Child, Command, Stdio},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use crate::{append_backend_error_log, append_backend_log, LaunchPlan};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Owns the backend child process. Spawned once at startup, never restarted.
#[derive(Debug, Default)]
pub struct BackendSupervisor {
    child: Arc<Mutex<Option<Child>>>,
}

impl BackendSupervisor {
    pub fn is_running(&self) -> bool {
        let Ok(mut guard) = self.child.lock() else {
            return false;
        };
        match guard.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(Ok(Some(_))) | Some(Err(_)) | None => false,
        }
    }

    pub fn start<F>(&self, plan: &LaunchPlan, log: F) -> Result<(), String>
    where
        F: Fn(&str),
    {
        let mut guard = self
            .child
            .lock()
            .map_err(|_| "Backend process lock poisoned.".to_string())?;
        if let Some(existing) = guard.as_mut() {
            if let Ok(None) = existing.try_wait() {
                log("backend already running; skipping spawn");
                return Ok(());
            }
        }

        if !plan.cwd.exists() {
            fs::create_dir_all(&plan.cwd).map_err(|error| {
                format!(
                    "Failed to create backend cwd {}: {}",
                    plan.cwd.display(),
                    error
                )
            })?;
        }

        let mut command = Command::new(&plan.cmd);
        command
            .args(&plan.args)
            .current_dir(&plan.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &plan.envs {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|error| {
            format!(
                "Failed to spawn backend process with command {:?}: {}",
                plan.debug_command(),
                error
            )
        })?;
        log(&format!(
            "backend started: pid={} command={:?} cwd={} packaged={}",
            child.id(),
            plan.debug_command(),
            plan.cwd.display(),
            plan.packaged_mode
        ));

        if let Some(stdout) = child.stdout.take() {
            forward_lines("backend-stdout", stdout, append_backend_log);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines("backend-stderr", stderr, append_backend_error_log);
        }

        *guard = Some(child);
        drop(guard);
        self.watch_exit();
        Ok(())
    }

    fn watch_exit(&self) {
        let child = Arc::clone(&self.child);
        let spawned = thread::Builder::new()
            .name("backend-exit-watch".to_string())
            .spawn(move || loop {
                thread::sleep(EXIT_POLL_INTERVAL);
                let Ok(mut guard) = child.lock() else {
                    return;
                };
                let Some(process) = guard.as_mut() else {
                    // Taken by stop(); teardown logs on its own.
                    return;
                };
                match process.try_wait() {
                    Ok(Some(status)) => {
                        *guard = None;
                        drop(guard);
                        match status.code() {
                            Some(code) => crate::append_desktop_log(&format!(
                                "backend exited with code {code}"
                            )),
                            None => crate::append_desktop_log(&format!(
                                "backend exited without code: {status}"
                            )),
                        }
                        return;
                    }
                    Ok(None) => {}
                    Err(error) => {
                        crate::append_desktop_log(&format!(
                            "failed to poll backend process status: {error}"
                        ));
                        return;
                    }
                }
            });
        if let Err(error) = spawned {
            crate::append_desktop_log(&format!("failed to start backend exit watcher: {error}"));
        }
    }

    /// Terminates the child if it is still alive. Safe to call repeatedly.
    pub fn stop<F>(&self, log: F)
    where
        F: Fn(&str),
    {
        let child = match self.child.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        let Some(mut process) = child else {
            return;
        };

        match process.try_wait() {
            Ok(Some(status)) => {
                log(&format!("backend already exited before shutdown: {status}"));
            }
            _ => {
                log(&format!("terminating backend pid={}", process.id()));
                stop_child_process(&mut process);
            }
        }
    }
}

fn forward_lines<R, F>(thread_name: &str, stream: R, sink: F)
where
    R: Read + Send + 'static,
    F: Fn(&str) + Send + 'static,
{
    let spawned = thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            let reader = BufReader::new(stream);
            for line in reader.split(b'\n') {
                match line {
                    Ok(bytes) => {
                        let text = String::from_utf8_lossy(&bytes);
                        let text = text.trim_end_matches('\r');
                        if !text.is_empty() {
                            sink(text);
                        }
                    }
                    Err(_) => break,
                }
            }
        });
    if let Err(error) = spawned {
        crate::append_desktop_log(&format!("failed to start {thread_name} forwarder: {error}"));
    }
}

fn stop_child_process(child: &mut Child) {
    #[cfg(target_os = "windows")]
    {
        let _ = Command::new("taskkill")
            .args(["/pid", &child.id().to_string(), "/t", "/f"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null())
            .status();
        let _ = child.wait();
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = child.kill();
        let _ = child.wait();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::{path::PathBuf, sync::mpsc};

    use super::*;

    fn shell_plan(script: &str) -> LaunchPlan {
        LaunchPlan {
            cmd: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            cwd: std::env::temp_dir(),
            envs: vec![("PYTHONUNBUFFERED".to_string(), "1".to_string())],
            packaged_mode: false,
        }
    }

    #[test]
    fn forward_lines_emits_each_line_without_terminators() {
        let (sender, receiver) = mpsc::channel();
        let input: &'static [u8] = b"first\r\nsecond\n\nthird";

        forward_lines("test-forward", input, move |line| {
            sender.send(line.to_string()).expect("send line");
        });

        let lines: Vec<String> = receiver.iter().collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn start_then_stop_terminates_long_running_child() {
        let supervisor = BackendSupervisor::default();
        supervisor
            .start(&shell_plan("sleep 30"), |_| {})
            .expect("spawn sleep");
        assert!(supervisor.is_running());

        supervisor.stop(|_| {});
        assert!(!supervisor.is_running());

        // Second stop is a no-op.
        supervisor.stop(|_| {});
    }

    #[test]
    fn start_reports_spawn_failure_for_missing_command() {
        let supervisor = BackendSupervisor::default();
        let plan = LaunchPlan {
            cmd: "/nonexistent/polywhale-backend".to_string(),
            args: Vec::new(),
            cwd: PathBuf::from(std::env::temp_dir()),
            envs: Vec::new(),
            packaged_mode: true,
        };

        let error = supervisor.start(&plan, |_| {}).expect_err("spawn fails");
        assert!(error.contains("Failed to spawn backend process"));
        assert!(!supervisor.is_running());
    }

    #[test]
    fn exited_child_is_cleared_by_exit_watcher() {
        let supervisor = BackendSupervisor::default();
        supervisor
            .start(&shell_plan("exit 3"), |_| {})
            .expect("spawn exit");

        for _ in 0..40 {
            if supervisor
                .child
                .lock()
                .map(|guard| guard.is_none())
                .unwrap_or(false)
            {
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }
        panic!("exit watcher did not clear the child handle");
    }
}
