//! Bounded hand-off of page sequences from a decoding thread to layout.
//!
//! ```text
//! Producer -> bounded channel -> LayoutSession
//!    |                               |
//! decode one sequence          lay it out, resolve ids
//! ```
//!
//! The resolution state never leaves the consumer; the producer only ever
//! runs `capacity` sequences ahead.

use crate::error::FormatError;
use folio_idf::PageSequence;
use folio_layout::{LayoutEngine, LayoutOutput, LayoutSession};
use folio_style::PageMaster;
use std::thread;

type Decoded = Result<PageSequence, FormatError>;

pub(crate) fn layout_buffered<T, F>(
    engine: &LayoutEngine,
    masters: &[PageMaster],
    items: Vec<T>,
    capacity: usize,
    decode: F,
) -> Result<LayoutOutput, FormatError>
where
    T: Send,
    F: Fn(T) -> Decoded + Send,
{
    let (tx, rx) = async_channel::bounded::<Decoded>(capacity.max(1));
    thread::scope(|scope| {
        let producer = scope.spawn(move || {
            for (index, item) in items.into_iter().enumerate() {
                let decoded = decode(item);
                let failed = decoded.is_err();
                if tx.send_blocking(decoded).is_err() {
                    log::debug!("Layout stopped before sequence {index}; producer exits.");
                    break;
                }
                if failed {
                    break;
                }
            }
        });

        let mut session = engine.start();
        let outcome = consume(&rx, &mut session, masters);
        rx.close();
        producer
            .join()
            .map_err(|_| FormatError::HandOff("sequence producer panicked".into()))?;
        outcome?;
        Ok(session.finish())
    })
}

fn consume(
    rx: &async_channel::Receiver<Decoded>,
    session: &mut LayoutSession<'_>,
    masters: &[PageMaster],
) -> Result<(), FormatError> {
    while let Ok(next) = rx.recv_blocking() {
        let sequence = next?;
        session.layout_sequence(masters, &sequence)?;
        log::debug!("Hand-off: {} page(s) so far.", session.page_count());
    }
    Ok(())
}
