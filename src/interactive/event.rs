use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub enum Event {
    Key(KeyEvent),
    Tick,
}

/// Polls the terminal on a background thread. Dropping the handler stops
/// the thread and waits for it, so nothing keeps reading stdin afterwards.
pub struct EventHandler {
    receiver: mpsc::Receiver<Event>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tick_rate: u64) -> Self {
        let (sender, receiver) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let worker = thread::spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                match event::poll(Duration::from_millis(tick_rate)) {
                    Ok(true) => {
                        if let Ok(CrosstermEvent::Key(key)) = event::read() {
                            if key.kind == KeyEventKind::Press && sender.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(_) => {}
                }
                if sender.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self {
            receiver,
            stop,
            worker: Some(worker),
        }
    }

    pub fn recv(&self) -> Result<Event, mpsc::RecvError> {
        self.receiver.recv()
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
