use crate::sequence::prelude::*;

async fn one_two_three() -> std::sync::Arc<Sequence<i32>> {
    let sequence = Sequence::<i32>::allocate(10).await;
    sequence.push(1).await;
    sequence.push(2).await;
    sequence.push(3).await;
    sequence
}

#[tokio::test]
async fn at() -> anyhow::Result<()> {
    let sequence = one_two_three().await;

    assert_eq!(sequence.at(0).await?, 1);
    assert_eq!(sequence.at(1).await?, 2);
    assert_eq!(sequence.at(2).await?, 3);

    let result = sequence.at(3).await;
    assert_eq!(result, Err(SequenceError::OutOfRange));
    assert_eq!(result.unwrap_or_default(), 0);

    assert_eq!(sequence.at(-1).await, Err(SequenceError::OutOfRange));
    assert_eq!(sequence.at(isize::MIN).await, Err(SequenceError::OutOfRange));

    Ok(())
}

#[tokio::test]
async fn at_empty() {
    let sequence = Sequence::<i32>::allocate(0).await;
    assert_eq!(sequence.at(0).await, Err(SequenceError::OutOfRange));
    assert_eq!(sequence.at(-1).await, Err(SequenceError::OutOfRange));
}

#[tokio::test]
async fn map() -> anyhow::Result<()> {
    let sequence = one_two_three().await;
    let capacity = sequence.capacity();

    sequence.map(|v| v * 2).await;
    assert_eq!(sequence.snapshot().await, vec![2, 4, 6]);
    assert_eq!(sequence.length(), 3);
    assert_eq!(sequence.capacity(), capacity);

    sequence.map(|v| v).await;
    assert_eq!(sequence.snapshot().await, vec![2, 4, 6]);

    Ok(())
}

#[tokio::test]
async fn map_owned_values() -> anyhow::Result<()> {
    let sequence = Sequence::<String>::allocate(2).await;
    sequence.push("a".to_string()).await;
    sequence.push("b".to_string()).await;

    sequence.map(|mut v| { v.push('!'); v }).await;
    assert_eq!(sequence.at(0).await?, "a!");
    assert_eq!(sequence.at(1).await?, "b!");

    Ok(())
}

#[tokio::test]
async fn filter() {
    let sequence = one_two_three().await;

    let filtered = sequence.filter(|v| *v > 1).await;
    assert_eq!(filtered, vec![2, 3]);

    let none = sequence.filter(|_| false).await;
    assert!(none.is_empty());

    let all = sequence.filter(|_| true).await;
    assert_eq!(all, vec![1, 2, 3]);

    // source untouched
    assert_eq!(sequence.snapshot().await, vec![1, 2, 3]);
}

#[tokio::test]
async fn find() -> anyhow::Result<()> {
    let sequence = one_two_three().await;

    assert_eq!(sequence.find(|v| *v > 1).await?, 2);

    let result = sequence.find(|v| *v > 3).await;
    assert_eq!(result, Err(SequenceError::NotFound));
    assert_eq!(result.unwrap_or_default(), 0);

    let empty = Sequence::<i32>::allocate(1).await;
    assert_eq!(empty.find(|_| true).await, Err(SequenceError::NotFound));

    Ok(())
}

#[tokio::test]
async fn find_stops_at_first_match() -> anyhow::Result<()> {
    let sequence = one_two_three().await;

    let mut visited = 0;
    let found = sequence.find(|v| { visited += 1; *v >= 2 }).await?;
    assert_eq!(found, 2);
    assert_eq!(visited, 2);

    Ok(())
}

#[tokio::test]
async fn each() {
    let sequence = one_two_three().await;

    let mut seen = vec![];
    sequence.each(|v| seen.push(*v)).await;
    assert_eq!(seen, vec![1, 2, 3]);

    let empty = Sequence::<i32>::allocate(1).await;
    let mut calls = 0;
    empty.each(|_| calls += 1).await;
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn scenario() -> anyhow::Result<()> {
    let sequence = one_two_three().await;

    assert_eq!(sequence.length(), 3);
    assert_eq!(sequence.render().await, "[1 2 3]");
    assert_eq!(sequence.at(1).await?, 2);
    assert_eq!(sequence.filter(|v| *v > 1).await, vec![2, 3]);

    let missing = sequence.find(|v| *v > 3).await;
    assert_eq!(missing, Err(SequenceError::NotFound));
    assert_eq!(missing.unwrap_or_default(), 0);

    assert_eq!(sequence.pop().await?, 3);
    assert_eq!(sequence.pop().await?, 2);
    assert_eq!(sequence.pop().await?, 1);
    assert_eq!(sequence.pop().await, Err(SequenceError::OutOfRange));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn map_panic_keeps_length_consistent() -> anyhow::Result<()> {
    let sequence = one_two_three().await;

    let seq_clone = sequence.clone();
    let handle = tokio::spawn(async move {
        seq_clone.map(|v| if v == 2 { panic!("transform failed on {}", v) } else { v * 10 }).await;
    });
    let joined = handle.await;
    assert!(joined.is_err_and(|error| error.is_panic()));

    // the element handed to the panicking transform is gone; the rest survive in order
    let snapshot = sequence.snapshot().await;
    assert_eq!(snapshot, vec![10, 3]);
    assert_eq!(sequence.length(), snapshot.len());
    assert!(sequence.capacity() >= sequence.length());

    assert_eq!(sequence.at(1).await?, 3);
    sequence.push(4).await;
    assert_eq!(sequence.length(), 3);
    assert_eq!(sequence.pop().await?, 4);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn each_holds_lock_for_whole_traversal() -> anyhow::Result<()> {
    use std::sync::{Arc, atomic::{AtomicBool, Ordering}, mpsc};

    let sequence = one_two_three().await;
    let (entered_tx, entered_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let traversed = Arc::new(AtomicBool::new(false));
    let pushed = Arc::new(AtomicBool::new(false));

    let visiting = {
        let seq_clone = sequence.clone();
        let traversed = traversed.clone();
        tokio::spawn(async move {
            let mut seen = vec![];
            let seen_ref = &mut seen;
            seq_clone.each(move |v| {
                seen_ref.push(*v);
                if *v == 1 {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                }
                if *v == 3 {
                    traversed.store(true, Ordering::SeqCst);
                }
            }).await;
            seen
        })
    };

    // the visitor is parked on the first element
    tokio::task::spawn_blocking(move || entered_rx.recv()).await??;

    let pushing = {
        let seq_clone = sequence.clone();
        let traversed = traversed.clone();
        let pushed = pushed.clone();
        tokio::spawn(async move {
            seq_clone.push(4).await;
            // push only gets the lock once the traversal is over
            assert!(traversed.load(Ordering::SeqCst));
            pushed.store(true, Ordering::SeqCst);
        })
    };

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!pushed.load(Ordering::SeqCst));
    assert_eq!(sequence.length(), 3);

    release_tx.send(())?;
    let seen = visiting.await?;
    pushing.await?;

    assert_eq!(seen, vec![1, 2, 3]);
    assert!(pushed.load(Ordering::SeqCst));
    assert_eq!(sequence.snapshot().await, vec![1, 2, 3, 4]);

    Ok(())
}
