use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::{Channel, TrySendError},
};

/// Queues `item`, discarding the oldest pending entries while the queue is
/// full. Returns how many entries were discarded.
///
/// Console requests go through this so a consumer that stopped draining
/// never wedges the command that feeds it.
pub fn enqueue_latest<M: RawMutex, T, const N: usize>(queue: &Channel<M, T, N>, item: T) -> usize {
    let mut dropped = 0;
    let mut item = item;
    loop {
        match queue.try_send(item) {
            Ok(()) => return dropped,
            Err(TrySendError::Full(back)) => {
                if queue.try_receive().is_ok() {
                    dropped += 1;
                }
                item = back;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    use super::*;

    #[test]
    fn fits_without_dropping() {
        let queue = Channel::<NoopRawMutex, u8, 2>::new();
        assert_eq!(enqueue_latest(&queue, 1), 0);
        assert_eq!(enqueue_latest(&queue, 2), 0);
        assert_eq!(queue.try_receive().ok(), Some(1));
        assert_eq!(queue.try_receive().ok(), Some(2));
    }

    #[test]
    fn undrained_queue_keeps_accepting_newest() {
        let queue = Channel::<NoopRawMutex, u8, 2>::new();
        for value in 0..10 {
            enqueue_latest(&queue, value);
        }
        assert_eq!(enqueue_latest(&queue, 10), 1);
        assert_eq!(queue.try_receive().ok(), Some(9));
        assert_eq!(queue.try_receive().ok(), Some(10));
        assert!(queue.try_receive().is_err());
    }
}
