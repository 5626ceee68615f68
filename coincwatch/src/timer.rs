use crate::Event;
use std::time::Duration;

/// Tick thread; the driver itself holds no timer
pub fn main(sender: flume::Sender<Event>, period: Duration) -> anyhow::Result<()> {
    std::thread::spawn(move || {
        while let Ok(()) = sender.send(Event::Tick) {
            std::thread::sleep(period);
        }
    });
    Ok(())
}
