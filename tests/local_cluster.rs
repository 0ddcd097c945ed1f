use ghostcolor::comm::ColorUpdate;
use ghostcolor::{ColoringError, Communicator, LocalCluster};

#[test]
fn collectives_interleave_with_uneven_traffic() {
    let out = LocalCluster::new(4)
        .try_run(|comm| {
            let mut seen = Vec::new();
            for round in 0..5u64 {
                // Only even ranks talk in even rounds.
                let mut sends = vec![Vec::new(); comm.size()];
                if (comm.rank() as u64 + round) % 2 == 0 {
                    for (dest, buf) in sends.iter_mut().enumerate() {
                        ColorUpdate::new(round, dest as u32).encode_into(buf);
                    }
                }
                let received = comm.all_to_all_v(sends)?;
                let updates: usize = received.iter().map(|b| b.len() / ColorUpdate::SIZE).sum();
                let total = comm.all_reduce_sum(updates as u64)?;
                seen.push(total);
            }
            Ok(seen)
        })
        .unwrap();
    // Two senders per round, four updates each.
    for seen in out {
        assert_eq!(seen, vec![8; 5]);
    }
}

#[test]
fn updates_decode_on_the_receiving_rank() {
    let out = LocalCluster::new(3)
        .try_run(|comm| {
            let sends = (0..comm.size())
                .map(|dest| {
                    let mut buf = Vec::new();
                    ColorUpdate::new(comm.rank() as u64 * 100 + dest as u64, 7)
                        .encode_into(&mut buf);
                    buf
                })
                .collect();
            let received = comm.all_to_all_v(sends)?;
            let mut gids = Vec::new();
            for buf in &received {
                for update in ColorUpdate::decode_all(buf)? {
                    gids.push(update.gid());
                }
            }
            Ok(gids)
        })
        .unwrap();
    assert_eq!(out[1], vec![1, 101, 201]);
}

#[test]
fn a_rank_that_leaves_early_fails_its_peers_cleanly() {
    let err = LocalCluster::new(3)
        .try_run(|comm| {
            if comm.rank() == 2 {
                return Err(ColoringError::InvalidConfig("rank 2 bails".into()));
            }
            comm.barrier()?;
            comm.all_reduce_max(1)
        })
        .unwrap_err();
    assert_eq!(err, ColoringError::InvalidConfig("rank 2 bails".into()));
}
