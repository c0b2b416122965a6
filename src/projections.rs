use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};

use crate::error::{JourneyError, JourneyResult};
use crate::models::{Event, Graph, GraphEdge, GraphNode, JourneyInsights, Step, Summary};
use crate::stage::{classify_stage, Stage};
use crate::timestamp::{format_instant, minutes_between, parse_time};

/// Ordered (from, to) stage pair observed between adjacent steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    pub from: Stage,
    pub to: Stage,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionStats {
    pub count: usize,
    pub total_minutes: f64,
}

impl TransitionStats {
    /// Negative elapsed time contributes zero minutes
    pub fn record(&mut self, delta_minutes: f64) {
        self.count += 1;
        self.total_minutes += delta_minutes.max(0.0);
    }

    pub fn avg_minutes(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.total_minutes / self.count as f64)
        }
    }
}

/// Counts keyed by first appearance, so output order is stable across builds
#[derive(Debug)]
struct FirstSeen<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K: Copy + Eq + std::hash::Hash, V: Default> FirstSeen<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: K) -> &mut V {
        let entries = &mut self.entries;
        let idx = *self.index.entry(key).or_insert_with(|| {
            entries.push((key, V::default()));
            entries.len() - 1
        });
        &mut self.entries[idx].1
    }

    fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

/// Accumulates transition statistics keyed by stage pair
#[derive(Debug)]
pub struct TransitionTracker {
    buckets: FirstSeen<TransitionKey, TransitionStats>,
}

impl Default for TransitionTracker {
    fn default() -> Self {
        Self {
            buckets: FirstSeen::new(),
        }
    }
}

impl TransitionTracker {
    pub fn record(&mut self, from: Stage, to: Stage, delta_minutes: f64) {
        self.buckets
            .entry(TransitionKey { from, to })
            .record(delta_minutes);
    }

    #[cfg(test)]
    pub fn get(&self, from: Stage, to: Stage) -> Option<&TransitionStats> {
        let idx = self.buckets.index.get(&TransitionKey { from, to })?;
        Some(&self.buckets.entries[*idx].1)
    }

    pub fn into_edges(self) -> Vec<GraphEdge> {
        self.buckets
            .into_entries()
            .into_iter()
            .map(|(key, stats)| GraphEdge {
                from: key.from,
                to: key.to,
                count: stats.count,
                avg_minutes: stats.avg_minutes(),
            })
            .collect()
    }
}

/// Projects a journey (summary, steps, transition graph) from raw events.
/// Holds no state beyond a single build.
pub struct JourneyProjector<'a> {
    events: &'a [Event],
}

impl<'a> JourneyProjector<'a> {
    pub fn new(events: &'a [Event]) -> Self {
        Self { events }
    }

    /// Parse every timestamp and sort ascending; equal instants keep input order
    fn sorted_events(&self) -> JourneyResult<Vec<(DateTime<FixedOffset>, &'a Event)>> {
        let mut timed = self
            .events
            .iter()
            .map(|event| {
                parse_time(&event.time)
                    .map(|instant| (instant, event))
                    .map_err(|source| JourneyError::InvalidTimestamp {
                        value: event.time.clone(),
                        source,
                    })
            })
            .collect::<JourneyResult<Vec<_>>>()?;

        timed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(timed)
    }

    /// Returns `Ok(None)` when there are no events to project
    pub fn project(&self) -> JourneyResult<Option<JourneyInsights>> {
        if self.events.is_empty() {
            return Ok(None);
        }

        let timed = self.sorted_events()?;

        let mut steps = Vec::with_capacity(timed.len());
        let mut transitions = TransitionTracker::default();
        let mut previous: Option<(Stage, DateTime<FixedOffset>)> = None;

        for (instant, event) in timed {
            let stage = classify_stage(event);
            trace!(stage = %stage, time = %event.time, "Classified event");

            steps.push(Step {
                id: event.resolved_id(),
                label: event.label(),
                subtitle: event.sub_title().map(str::to_string),
                channel: event.channel(),
                time: format_instant(&instant),
                category: stage,
                sentiment: event.sentiment(),
            });

            if let Some((prev_stage, prev_instant)) = previous {
                transitions.record(prev_stage, stage, minutes_between(&prev_instant, &instant));
            }
            previous = Some((stage, instant));
        }

        let summary = summarize(&steps);
        let graph = Graph {
            nodes: stage_nodes(&steps),
            edges: transitions.into_edges(),
        };

        debug!(
            steps = steps.len(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "Projected journey"
        );

        Ok(Some(JourneyInsights {
            summary,
            steps,
            graph,
        }))
    }
}

/// Convenience wrapper over [`JourneyProjector`]
pub fn build_journey_insights(events: &[Event]) -> JourneyResult<Option<JourneyInsights>> {
    JourneyProjector::new(events).project()
}

fn summarize(steps: &[Step]) -> Summary {
    let channels: BTreeSet<&str> = steps.iter().map(|s| s.channel.as_str()).collect();
    let first_contact = steps.first().map(|s| s.time.clone()).unwrap_or_default();
    let last_contact = steps.last().map(|s| s.time.clone()).unwrap_or_default();

    Summary {
        total_interactions: steps.len(),
        channels_used: channels.into_iter().map(str::to_string).collect(),
        first_contact,
        last_contact,
    }
}

fn stage_nodes(steps: &[Step]) -> Vec<GraphNode> {
    let mut counts: FirstSeen<Stage, usize> = FirstSeen::new();
    for step in steps {
        *counts.entry(step.category) += 1;
    }

    counts
        .into_entries()
        .into_iter()
        .map(|(stage, count)| GraphNode {
            id: stage,
            label: stage,
            count,
        })
        .collect()
}
