//! mpv as the playback widget, driven over its JSON IPC socket.
//!
//! Each loaded track gets its own `mpv --no-video` process. A reader thread
//! connects to the socket, subscribes to the properties the engine cares
//! about and turns mpv's messages into [`Signal`]s. Commands issued before
//! the socket is up are queued and flushed on connect.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::lookup::watch_url;
use super::widget::{Notifier, PlayerWidget, WidgetFactory, WidgetNotice, WidgetState};
use crate::ambience::AmbienceSink;
use crate::error::{GiftError, Result};

const CONNECT_ATTEMPTS: u32 = 100;
const CONNECT_BACKOFF: Duration = Duration::from_millis(50);

static NEXT_SOCKET: AtomicU64 = AtomicU64::new(0);

/// Properties observed on connect, in observer-id order.
const OBSERVED: [&str; 4] = ["pause", "time-pos", "duration", "eof-reached"];

/// Request id of the `duration` query sent on connect. A successful reply
/// means the file finished loading before the socket came up.
const LOADED_QUERY: u64 = 1;

#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    Loaded { duration: f64 },
    Paused(bool),
    Ended,
    Failed(String),
    /// The process went away without being asked to.
    Exited,
}

#[derive(Deserialize)]
struct Message {
    event: Option<String>,
    name: Option<String>,
    data: Option<Value>,
    reason: Option<String>,
    file_error: Option<String>,
    request_id: Option<u64>,
    error: Option<String>,
}

#[derive(Default)]
struct Clock {
    position: f64,
    duration: f64,
}

#[derive(Default)]
struct Link {
    stream: Option<UnixStream>,
    pending: Vec<String>,
}

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct MpvProcess {
    child: Option<Child>,
    link: Arc<Mutex<Link>>,
    clock: Arc<Mutex<Clock>>,
    closing: Arc<AtomicBool>,
    socket: PathBuf,
}

impl MpvProcess {
    /// Starts `program` on `target` (URL or file) paused.
    pub fn spawn<F>(program: &str, target: &str, extra_args: &[&str], on_signal: F) -> Result<Self>
    where
        F: FnMut(Signal) + Send + 'static,
    {
        let dir = crate::paths::runtime_dir();
        std::fs::create_dir_all(&dir)?;
        let socket = dir.join(format!(
            "mpv-{}-{}.sock",
            std::process::id(),
            NEXT_SOCKET.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_file(&socket);

        let mut child = Command::new(program)
            .arg("--no-video")
            .arg("--no-terminal")
            .arg("--pause")
            .arg(format!("--input-ipc-server={}", socket.display()))
            .args(extra_args)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| GiftError::Player(format!("could not start {program}: {e}")))?;
        tracing::debug!(program, target, pid = child.id(), "spawned player");

        let link = Arc::new(Mutex::new(Link::default()));
        let clock = Arc::new(Mutex::new(Clock::default()));
        let closing = Arc::new(AtomicBool::new(false));
        {
            let socket = socket.clone();
            let link = link.clone();
            let clock = clock.clone();
            let closing = closing.clone();
            let reader = thread::Builder::new()
                .name("mpv-ipc".into())
                .spawn(move || run_reader(&socket, &link, &clock, &closing, on_signal));
            if let Err(e) = reader {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e.into());
            }
        }

        Ok(Self {
            child: Some(child),
            link,
            clock,
            closing,
            socket,
        })
    }

    pub fn command(&self, args: Value) {
        let line = format!("{}\n", json!({ "command": args }));
        let mut link = locked(&self.link);
        match link.stream.as_mut() {
            Some(stream) => {
                if let Err(e) = stream.write_all(line.as_bytes()) {
                    tracing::warn!(error = %e, "player command failed");
                }
            }
            None => link.pending.push(line),
        }
    }

    pub fn set_property(&self, name: &str, value: Value) {
        self.command(json!(["set_property", name, value]));
    }

    pub fn position(&self) -> f64 {
        locked(&self.clock).position
    }

    pub fn duration(&self) -> f64 {
        locked(&self.clock).duration
    }

    pub fn shutdown(&mut self) {
        if self.closing.swap(true, Ordering::SeqCst) {
            return;
        }
        self.command(json!(["quit"]));
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = std::fs::remove_file(&self.socket);
    }
}

impl Drop for MpvProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn connect(socket: &Path, closing: &AtomicBool) -> Option<UnixStream> {
    for _ in 0..CONNECT_ATTEMPTS {
        if closing.load(Ordering::SeqCst) {
            return None;
        }
        if let Ok(stream) = UnixStream::connect(socket) {
            return Some(stream);
        }
        thread::sleep(CONNECT_BACKOFF);
    }
    None
}

fn run_reader<F>(socket: &Path, link: &Mutex<Link>, clock: &Mutex<Clock>, closing: &AtomicBool, mut on_signal: F)
where
    F: FnMut(Signal),
{
    let Some(stream) = connect(socket, closing) else {
        if !closing.load(Ordering::SeqCst) {
            on_signal(Signal::Failed("player IPC socket never came up".into()));
        }
        return;
    };
    let mut writer = match stream.try_clone() {
        Ok(w) => w,
        Err(e) => {
            on_signal(Signal::Failed(format!("player IPC: {e}")));
            return;
        }
    };

    {
        let mut link = locked(link);
        let observe = OBSERVED.iter().enumerate().map(|(i, name)| {
            format!("{}\n", json!({ "command": ["observe_property", i + 1, name] }))
        });
        let query = format!(
            "{}\n",
            json!({ "command": ["get_property", "duration"], "request_id": LOADED_QUERY })
        );
        let lines: Vec<String> = observe
            .chain(std::iter::once(query))
            .chain(link.pending.drain(..))
            .collect();
        for line in lines {
            if let Err(e) = writer.write_all(line.as_bytes()) {
                tracing::warn!(error = %e, "player IPC write failed");
            }
        }
        link.stream = Some(writer);
    }

    for line in BufReader::new(stream).lines() {
        let Ok(line) = line else {
            break;
        };
        match serde_json::from_str::<Message>(&line) {
            Ok(msg) => {
                if let Some(signal) = interpret(msg, clock) {
                    on_signal(signal);
                }
            }
            Err(e) => tracing::trace!(error = %e, line, "unparsed player message"),
        }
    }

    if !closing.load(Ordering::SeqCst) {
        on_signal(Signal::Exited);
    }
}

fn interpret(msg: Message, clock: &Mutex<Clock>) -> Option<Signal> {
    if msg.request_id == Some(LOADED_QUERY) {
        // "property unavailable" until the file is loaded; file-loaded follows.
        if msg.error.as_deref() != Some("success") {
            return None;
        }
        let duration = msg.data?.as_f64()?;
        locked(clock).duration = duration;
        return Some(Signal::Loaded { duration });
    }
    match msg.event.as_deref()? {
        "property-change" => {
            let data = msg.data?;
            match msg.name.as_deref()? {
                "pause" => data.as_bool().map(Signal::Paused),
                "time-pos" => {
                    locked(clock).position = data.as_f64()?;
                    None
                }
                "duration" => {
                    locked(clock).duration = data.as_f64()?;
                    None
                }
                "eof-reached" => data.as_bool().filter(|eof| *eof).map(|_| Signal::Ended),
                _ => None,
            }
        }
        "file-loaded" => Some(Signal::Loaded {
            duration: locked(clock).duration,
        }),
        "end-file" if msg.reason.as_deref() == Some("error") => Some(Signal::Failed(
            msg.file_error.unwrap_or_else(|| "unplayable track".into()),
        )),
        _ => None,
    }
}

// ── Widget ─────────────────────────────────────────────────────────

pub struct MpvFactory {
    program: String,
}

impl MpvFactory {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl WidgetFactory for MpvFactory {
    fn create(&mut self, notifier: Notifier) -> Box<dyn PlayerWidget> {
        Box::new(MpvWidget {
            program: self.program.clone(),
            notifier,
            process: None,
        })
    }
}

pub struct MpvWidget {
    program: String,
    notifier: Notifier,
    process: Option<MpvProcess>,
}

fn notice_for(signal: Signal) -> WidgetNotice {
    match signal {
        Signal::Loaded { duration } => WidgetNotice::Ready { duration },
        Signal::Paused(true) => WidgetNotice::StateChange(WidgetState::Paused),
        Signal::Paused(false) => WidgetNotice::StateChange(WidgetState::Playing),
        Signal::Ended => WidgetNotice::StateChange(WidgetState::Ended),
        Signal::Failed(reason) => WidgetNotice::Error(reason),
        Signal::Exited => WidgetNotice::Error("player exited".into()),
    }
}

impl PlayerWidget for MpvWidget {
    fn load(&mut self, video_id: &str) {
        let url = watch_url(video_id);
        if let Some(process) = &self.process {
            process.command(json!(["loadfile", url]));
            return;
        }
        let notifier = self.notifier.clone();
        let spawned = MpvProcess::spawn(
            &self.program,
            &url,
            &["--idle=yes", "--keep-open=yes"],
            move |signal| notifier.send(notice_for(signal)),
        );
        match spawned {
            Ok(process) => self.process = Some(process),
            Err(e) => {
                tracing::error!(generation = self.notifier.generation(), error = %e, "player unavailable");
                self.notifier.send(WidgetNotice::Error(e.to_string()));
            }
        }
    }

    fn play(&mut self) {
        if let Some(p) = &self.process {
            p.set_property("pause", json!(false));
        }
    }

    fn pause(&mut self) {
        if let Some(p) = &self.process {
            p.set_property("pause", json!(true));
        }
    }

    fn seek(&mut self, seconds: f64) {
        if let Some(p) = &self.process {
            p.command(json!(["seek", seconds, "absolute"]));
        }
    }

    fn position(&self) -> f64 {
        self.process.as_ref().map_or(0.0, MpvProcess::position)
    }

    fn duration(&self) -> f64 {
        self.process.as_ref().map_or(0.0, MpvProcess::duration)
    }

    fn destroy(&mut self) {
        if let Some(mut process) = self.process.take() {
            process.shutdown();
        }
    }
}

// ── Ambience ───────────────────────────────────────────────────────

/// A local file looped forever by its own mpv process.
pub struct MpvAmbience {
    process: MpvProcess,
    failed: Arc<AtomicBool>,
}

impl MpvAmbience {
    pub fn spawn(program: &str, track: &Path) -> Result<Self> {
        let failed = Arc::new(AtomicBool::new(false));
        let flag = failed.clone();
        let process = MpvProcess::spawn(
            program,
            &track.to_string_lossy(),
            &["--loop-file=inf", "--volume=0"],
            move |signal| match signal {
                Signal::Failed(reason) => {
                    tracing::error!(error = %reason, "ambience track failed");
                    flag.store(true, Ordering::SeqCst);
                }
                Signal::Exited => {
                    tracing::error!("ambience player exited");
                    flag.store(true, Ordering::SeqCst);
                }
                _ => {}
            },
        )?;
        tracing::info!(track = %track.display(), "ambience track ready");
        Ok(Self { process, failed })
    }
}

impl AmbienceSink for MpvAmbience {
    fn play(&mut self) {
        self.process.set_property("pause", json!(false));
    }

    fn pause(&mut self) {
        self.process.set_property("pause", json!(true));
    }

    fn set_volume(&mut self, volume: f64) {
        self.process
            .set_property("volume", json!((volume.clamp(0.0, 1.0) * 100.0).round()));
    }

    fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}
