//! 调度器
//!
//! 单线程、按到期时间排序的事件队列。会话的所有步骤都在同一条逻辑时间线上串行执行，
//! 任意两个事件不会并发运行。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// `run_paced` 的结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacedExit {
    /// 事件队列已空
    Drained,
    /// 到达墙钟上限，队列中可能仍有事件
    LimitReached,
}

/// 事件调度器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Scheduler {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
}

impl Scheduler {
    /// 获取当前时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中尚未执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 调度事件在指定时间执行
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            due: at.max(self.now),
            seq,
            ev: Box::new(ev),
        });

        debug!(queue_size = self.q.len(), "事件已加入队列");
    }

    /// 调度事件在 `delay` 之后执行
    pub fn schedule_after<E: Event>(&mut self, delay: SimTime, ev: E) {
        let at = self.now.after(delay);
        self.schedule(at, ev);
    }

    /// 丢弃所有未执行的事件，返回丢弃数量。
    pub fn clear(&mut self) -> usize {
        let n = self.q.len();
        self.q.clear();
        if n > 0 {
            debug!(dropped = n, "清空事件队列");
        }
        n
    }

    fn step(&mut self, item: ScheduledEvent, world: &mut dyn World) {
        self.now = item.due;
        trace!(now = ?self.now, seq = item.seq, remaining_queue = self.q.len(), "执行事件");
        item.ev.execute(self, world);
    }

    /// 运行直到事件队列为空或到达 `until`（虚拟时间）。
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        while let Some(top) = self.q.peek() {
            if top.due > until {
                break;
            }
            let Some(item) = self.q.pop() else { break };
            self.step(item, world);
        }
        self.now = self.now.max(until);
    }

    /// 运行所有事件直到队列为空（虚拟时间，不真正等待）。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        debug!(now = ?self.now, queue_size = self.q.len(), "初始状态");

        let mut event_count = 0u64;
        while let Some(item) = self.q.pop() {
            event_count += 1;
            self.step(item, world);
        }

        debug!(total_events = event_count, final_time = ?self.now, "事件队列已空");
    }

    /// 按墙钟节奏运行：每个事件至少等到其到期时间才执行。
    ///
    /// `limit` 为相对于调用时刻的墙钟上限；`None` 表示一直运行到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run_paced(&mut self, limit: Option<Duration>, world: &mut dyn World) -> PacedExit {
        let base = self.now;
        let started = Instant::now();
        info!("▶️  开始按墙钟运行");

        while let Some(top) = self.q.peek() {
            let offset = SimTime(top.due.0.saturating_sub(base.0)).as_duration();
            if let Some(limit) = limit {
                if offset > limit {
                    self.now = base.after(SimTime(limit.as_nanos() as u64));
                    info!(pending = self.q.len(), "⏹️  到达运行时限");
                    return PacedExit::LimitReached;
                }
            }

            let elapsed = started.elapsed();
            if offset > elapsed {
                std::thread::sleep(offset - elapsed);
            }

            let Some(item) = self.q.pop() else { break };
            self.step(item, world);
        }

        info!(final_time = ?self.now, "✅ 事件队列已空");
        PacedExit::Drained
    }
}
