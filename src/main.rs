//! Terminal runner (default binary).
//!
//! Reads keys with crossterm, drains commands from the control socket, runs one
//! engine step every `TICK_MS`, then redraws. The terminal is restored on every
//! exit path.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};

use blockfall::adapter::{
    build_observation, create_ack, Adapter, InboundPayload, OutboundMessage,
};
use blockfall::core::{Clock, GameSnapshot, GameState, MonotonicClock};
use blockfall::input::{is_actionable, map_key};
use blockfall::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use blockfall::types::{GameAction, TICK_MS};

fn main() -> Result<()> {
    let seed = seed_from_env()?;
    let adapter = Adapter::start_from_env()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, seed, adapter);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// `BLOCKFALL_SEED` if set, otherwise derived from the wall clock.
fn seed_from_env() -> Result<u32> {
    match std::env::var("BLOCKFALL_SEED") {
        Ok(s) => s
            .trim()
            .parse()
            .with_context(|| format!("invalid BLOCKFALL_SEED: {:?}", s)),
        Err(_) => Ok(SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(1)),
    }
}

struct PendingAck {
    client_id: usize,
    seq: u64,
    accepted: u32,
    ignored: u32,
}

fn run(term: &mut TerminalRenderer, seed: u32, mut adapter: Option<Adapter>) -> Result<()> {
    let clock = MonotonicClock::new();
    let mut game = GameState::new(seed);
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);

    let mut actions: Vec<GameAction> = Vec::with_capacity(64);
    let mut acks: Vec<PendingAck> = Vec::new();
    let mut snapshot_requests: Vec<usize> = Vec::new();
    let mut last_broadcast: Option<GameSnapshot> = None;
    let mut obs_seq = 0u64;

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut next_tick = Instant::now();

    loop {
        // Input with timeout until next tick.
        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if is_actionable(&key) => {
                    if let Some(action) = map_key(key, game.mode()) {
                        actions.push(action);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
            if Instant::now() < next_tick {
                continue;
            }
        }

        if let Some(adapter) = adapter.as_mut() {
            while let Some(cmd) = adapter.try_recv() {
                match cmd.payload {
                    InboundPayload::Actions {
                        actions: received,
                        ignored,
                    } => {
                        acks.push(PendingAck {
                            client_id: cmd.client_id,
                            seq: cmd.seq,
                            accepted: received.len() as u32,
                            ignored,
                        });
                        actions.extend(received);
                    }
                    InboundPayload::SnapshotRequest => snapshot_requests.push(cmd.client_id),
                }
            }
        }

        let report = game.tick(clock.now_ms(), &actions);
        actions.clear();

        if let Some(adapter) = adapter.as_ref() {
            for ack in acks.drain(..) {
                adapter.send(OutboundMessage::ToClientAck {
                    client_id: ack.client_id,
                    ack: create_ack(ack.seq, ack.accepted, ack.ignored),
                });
            }

            let snap = game.snapshot();
            for client_id in snapshot_requests.drain(..) {
                obs_seq += 1;
                adapter.send(OutboundMessage::ToClientObservation {
                    client_id,
                    obs: build_observation(&snap, obs_seq),
                });
            }
            if last_broadcast.as_ref() != Some(&snap) {
                obs_seq += 1;
                adapter.send(OutboundMessage::BroadcastObservation {
                    obs: build_observation(&snap, obs_seq),
                });
                last_broadcast = Some(snap);
            }
        }

        if report.quit {
            return Ok(());
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&game.snapshot(), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        next_tick += tick_duration;
        let now = Instant::now();
        if next_tick < now {
            // Fell behind (suspended terminal, slow flush); don't try to catch up.
            next_tick = now + tick_duration;
        }
    }
}
