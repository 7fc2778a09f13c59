//! The `Sim` struct and its event loop.

use log::{debug, trace};
use tq_core::{EventKind, LatencyModel, QueryId, SimConfig, SimRng, SimTime, TqError, VehicleId};
use tq_fleet::{QueryOracle, QuerySpec, QueryState, Vehicle};
use tq_policy::{ContactPolicy, Observation};

use crate::outcome::{QueryReport, round_to};
use crate::{ContactFate, Event, EventQueue, SimError, SimObserver, SimOutcome, SimResult};

/// The discrete-event engine.
///
/// `Sim<P, O>` owns time, vehicles, query counters and the event queue.  The
/// policy `P` decides whom to contact; the oracle `O` supplies work and
/// answers.  One `Sim` runs once:
///
/// 1. **Init**: pools from vehicles active at the starting time; one
///    `VehicleJoining` event per later window start within the horizon.
/// 2. **First batches**: every query, in a random order, gets the
///    policy's `first_batch`, contacted at the starting time.
/// 3. **Loop**: pop the earliest event, stop past the horizon.
///    - `VehicleJoining` → `new_active_vehicle`, contact the returned pairs.
///    - `OnTimeAnswer` / `LateAnswer` → count the answer, `update`.
///    - `TimerFired` → `timer_triggered`.
///
///    After any non-joining event, `next_batch` for that event's query.
/// 4. **Finalize**: unresolved queries get an infinite resolution time.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<P: ContactPolicy, O: QueryOracle> {
    pub config: SimConfig,

    /// Time of the event being dispatched.
    pub clock: SimTime,

    /// Indexed by `VehicleId`.
    pub vehicles: Vec<Vehicle>,

    /// Indexed by `QueryId`.
    pub queries: Vec<QueryState>,

    pub policy: P,

    pub oracle: O,

    pub(crate) latency: Box<dyn LatencyModel>,

    /// Query order and latency draws.
    pub(crate) rng: SimRng,

    /// Handed to the policy; kept apart so latency draws never shift pool
    /// shuffles.
    pub(crate) policy_rng: SimRng,

    pub events: EventQueue,

    pub(crate) dispatched: u64,

    pub(crate) ran: bool,
}

impl<P: ContactPolicy, O: QueryOracle> Sim<P, O> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation to completion and report the outcome.
    ///
    /// Fails with [`SimError::AlreadyRan`] on a second call, with
    /// `VehicleNotFound` / `QueryNotFound` if the policy returns an id outside
    /// the fleet or the query list, and with `Latency` on a NaN latency.
    pub fn run<Obs: SimObserver>(&mut self, observer: &mut Obs) -> SimResult<SimOutcome> {
        if self.ran {
            return Err(SimError::AlreadyRan);
        }
        self.ran = true;

        self.initialize(observer)?;

        while let Some(event) = self.events.pop() {
            if self.config.is_past_horizon(event.time) {
                debug!("{}: horizon reached at {}", self.policy.name(), event.time);
                break;
            }
            self.clock = event.time;
            self.dispatched += 1;
            observer.on_event(&event);
            self.dispatch(event, observer)?;
        }

        self.finalize();
        observer.on_sim_end(self.clock);

        let outcome = self.outcome();
        debug!(
            "{}: {} events, {}/{} queries resolved, total work {} ms",
            outcome.policy,
            outcome.events_processed,
            outcome.reports.iter().filter(|r| r.is_resolved()).count(),
            outcome.reports.len(),
            outcome.total_work_ms,
        );
        Ok(outcome)
    }

    /// Mark unresolved queries as never resolving.  Idempotent.
    pub fn finalize(&mut self) {
        for (i, q) in self.queries.iter_mut().enumerate() {
            if q.remaining > 0 && q.resolution.is_none() {
                trace!(
                    "query {i} unresolved; {} of {} positives; estimate {:?}",
                    q.positive, q.spec.threshold, q.estimate
                );
            }
            q.finalize();
        }
    }

    /// Snapshot of the current counters in reporting units.
    pub fn outcome(&self) -> SimOutcome {
        let start = self.config.start();
        let reports: Vec<QueryReport> = self
            .queries
            .iter()
            .enumerate()
            .map(|(i, q)| QueryReport::new(QueryId(i as u32), q, start))
            .collect();
        let total: f64 = self.vehicles.iter().map(|v| v.work_ms).sum();

        SimOutcome {
            policy:           self.policy.name(),
            resolution_ms:    reports.iter().map(|r| r.resolution_ms).collect(),
            total_work_ms:    round_to(total, 2),
            estimates:        reports.iter().map(|r| r.estimate).collect(),
            vehicle_work_ms:  self.vehicles.iter().map(|v| round_to(v.work_ms, 2)).collect(),
            reports,
            events_processed: self.dispatched,
            end_time:         self.clock,
        }
    }

    // ── Run phases ────────────────────────────────────────────────────────

    fn initialize<Obs: SimObserver>(&mut self, observer: &mut Obs) -> SimResult<()> {
        let start = self.config.start();

        let mut order: Vec<QueryId> = (0..self.queries.len() as u32).map(QueryId).collect();
        self.rng.shuffle(&mut order);

        let active: Vec<VehicleId> =
            self.vehicles.iter().filter(|v| v.is_active(start)).map(|v| v.id).collect();
        debug!(
            "{}: start {start}; {} of {} vehicles active; {} queries",
            self.policy.name(),
            active.len(),
            self.vehicles.len(),
            self.queries.len(),
        );
        let specs: Vec<QuerySpec> = self.queries.iter().map(|q| q.spec.clone()).collect();
        self.policy.init_pools(&active, &specs, &mut self.policy_rng);

        let horizon = self.config.end();
        for v in &self.vehicles {
            for t in v.connectivity.joins_after(start, horizon) {
                self.events.push(Event::joining(t, v.id));
            }
        }

        // A zero threshold is met before anyone is asked.
        for q in &mut self.queries {
            if q.remaining <= 0 {
                q.resolution = Some(start);
            }
        }

        for query in order {
            trace!("initialization of query {}", query.0);
            let n = self.query_state(query)?.spec.threshold;
            for vehicle in self.policy.first_batch(query, n) {
                self.contact(start, query, vehicle, observer)?;
            }
        }
        Ok(())
    }

    fn dispatch<Obs: SimObserver>(&mut self, event: Event, observer: &mut Obs) -> SimResult<()> {
        let time = event.time;
        let Some(query) = event.query else {
            let pairs = self.policy.new_active_vehicle(time, event.vehicle, &mut self.policy_rng);
            trace!("{:.4}; vehicle {} becomes active; {} contacts", time.0, event.vehicle.0, pairs.len());
            for (q, v) in pairs {
                self.contact(time, q, v, observer)?;
            }
            return Ok(());
        };

        match event.kind {
            EventKind::OnTimeAnswer | EventKind::LateAnswer => {
                self.receive_answer(&event, query, observer)?;
            }
            EventKind::TimerFired => {
                trace!("{:.4}; timer for query {} vehicle {} triggered", time.0, query.0, event.vehicle.0);
                self.policy.timer_triggered(time, query, event.vehicle);
            }
            EventKind::VehicleJoining => {}
        }

        let remaining = self.query_state(query)?.remaining;
        for vehicle in self.policy.next_batch(time, query, remaining) {
            self.contact(time, query, vehicle, observer)?;
        }
        Ok(())
    }

    // ── Contact execution ─────────────────────────────────────────────────

    /// Send `query` to `vehicle` at `time` and schedule what follows.
    ///
    /// The sampled latency is used for both directions; negative samples
    /// count as zero so no event lands before `time`.  Work is charged to
    /// the vehicle whenever the query is delivered, even if the answer is
    /// then lost to a disconnect.
    fn contact<Obs: SimObserver>(
        &mut self,
        time:     SimTime,
        query:    QueryId,
        vehicle:  VehicleId,
        observer: &mut Obs,
    ) -> SimResult<()> {
        let v = self
            .vehicles
            .get_mut(vehicle.index())
            .ok_or(SimError::Core(TqError::VehicleNotFound(vehicle)))?;
        let q = self
            .queries
            .get_mut(query.index())
            .ok_or(SimError::Core(TqError::QueryNotFound(query)))?;

        let latency_ms = self.latency.sample_ms(&mut self.rng);
        if latency_ms.is_nan() {
            return Err(SimError::Core(TqError::Latency(format!(
                "NaN latency for query {} to vehicle {}",
                query.0, vehicle.0
            ))));
        }
        let latency_ms = latency_ms.max(0.0);
        q.contacted += 1;
        let ready = time.after_millis(latency_ms + q.spec.payload_ms);
        let timer = time.after_millis(self.config.timer_duration_ms);
        trace!(
            "{:.4}; query {} to vehicle {}; latency {latency_ms} ms; timer at {:.4}",
            time.0, query.0, vehicle.0, timer.0
        );

        let window_end = v.connectivity.period_at(ready).map(|p| p.end);
        let fate = match window_end {
            None => {
                trace!("{:.4}; vehicle {} inactive at {:.4}", time.0, vehicle.0, ready.0);
                self.events.push(Event::contact(timer, query, vehicle, EventKind::TimerFired, 0.0));
                ContactFate::Unreachable
            }
            Some(end) => {
                let work = self.oracle.work_ms(q.spec.column, vehicle);
                let done = v.enqueue(ready, work);
                if done < end {
                    let answer_at = done.after_millis(latency_ms);
                    if answer_at > timer {
                        self.events.push(Event::contact(timer, query, vehicle, EventKind::TimerFired, work));
                        self.events.push(Event::contact(answer_at, query, vehicle, EventKind::LateAnswer, work));
                        ContactFate::Late { answer_at }
                    } else {
                        self.events.push(Event::contact(answer_at, query, vehicle, EventKind::OnTimeAnswer, work));
                        ContactFate::OnTime { answer_at }
                    }
                } else {
                    trace!("{:.4}; query {} aborted on vehicle {} at {:.4}", time.0, query.0, vehicle.0, end.0);
                    self.events.push(Event::contact(timer, query, vehicle, EventKind::TimerFired, work));
                    ContactFate::Aborted { window_end: end }
                }
            }
        };

        observer.on_contact(time, query, vehicle, &fate);
        Ok(())
    }

    /// Count an answer and pass it to the policy.
    fn receive_answer<Obs: SimObserver>(
        &mut self,
        event:    &Event,
        query:    QueryId,
        observer: &mut Obs,
    ) -> SimResult<()> {
        let q = self
            .queries
            .get_mut(query.index())
            .ok_or(SimError::Core(TqError::QueryNotFound(query)))?;
        let positive = self.oracle.answer(q.spec.column, event.vehicle);
        let resolved = q.record_answer(positive, event.time);
        trace!(
            "{:.4}; answer for query {} from vehicle {}: {positive}; remaining {}",
            event.time.0, query.0, event.vehicle.0, q.remaining
        );
        if resolved {
            trace!("{:.4}; query {} resolved; estimate {:?}", event.time.0, query.0, q.estimate);
            observer.on_resolved(query, event.time);
        }

        self.policy.update(Observation {
            query,
            vehicle:  event.vehicle,
            time:     event.time,
            positive,
            work_ms:  event.work_ms,
            kind:     event.kind,
        });
        Ok(())
    }

    fn query_state(&self, query: QueryId) -> SimResult<&QueryState> {
        self.queries.get(query.index()).ok_or(SimError::Core(TqError::QueryNotFound(query)))
    }
}
