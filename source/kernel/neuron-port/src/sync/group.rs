// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Fixed task/ISR lock pairs protecting kernel objects
//! OWNERS: @kernel-sync-team
//! PUBLIC API: LockGroup, ObjectKind, GroupGuard, with_group()
//! INVARIANTS: Task lock always taken before ISR lock and released after it; pairs never reassigned

use crate::hal::CoreContext;
use crate::types::LockId;

use super::PortSync;

/// Task-context lock and ISR-context lock guarding one data structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockGroup {
    pub task: LockId,
    pub isr: LockId,
}

impl LockGroup {
    /// Scheduler and kernel-internal structures.
    pub const KERNEL: Self = Self::new(LockId::Task, LockId::Isr);
    pub const EVENT_GROUP: Self = Self::shared(LockId::EventGroup);
    pub const QUEUE: Self = Self::shared(LockId::Queue);
    pub const STREAM_BUFFER: Self = Self::shared(LockId::StreamBuffer);
    pub const TIMER: Self = Self::shared(LockId::Timer);
    pub const USER: Self = Self::shared(LockId::User);

    pub const fn new(task: LockId, isr: LockId) -> Self {
        Self { task, isr }
    }

    /// Group whose halves share one cell; the second acquisition recurses.
    pub const fn shared(lock: LockId) -> Self {
        Self { task: lock, isr: lock }
    }
}

/// Kernel object types with a statically assigned lock group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Kernel,
    EventGroup,
    Queue,
    StreamBuffer,
    Timer,
    User,
}

impl ObjectKind {
    pub const fn lock_group(self) -> LockGroup {
        match self {
            ObjectKind::Kernel => LockGroup::KERNEL,
            ObjectKind::EventGroup => LockGroup::EVENT_GROUP,
            ObjectKind::Queue => LockGroup::QUEUE,
            ObjectKind::StreamBuffer => LockGroup::STREAM_BUFFER,
            ObjectKind::Timer => LockGroup::TIMER,
            ObjectKind::User => LockGroup::USER,
        }
    }
}

/// Holds a lock group from task context until dropped.
#[must_use = "dropping the guard unlocks the group immediately"]
pub struct GroupGuard<'a, S: PortSync, C: CoreContext> {
    sync: &'a S,
    cpu: &'a C,
    group: LockGroup,
}

impl<'a, S: PortSync, C: CoreContext> GroupGuard<'a, S, C> {
    pub fn lock(sync: &'a S, cpu: &'a C, group: LockGroup) -> Self {
        sync.lock_group(cpu, group);
        Self { sync, cpu, group }
    }

    pub fn group(&self) -> LockGroup {
        self.group
    }
}

impl<S: PortSync, C: CoreContext> Drop for GroupGuard<'_, S, C> {
    fn drop(&mut self) {
        self.sync.unlock_group(self.cpu, self.group);
    }
}

/// Runs `f` with `group` held from task context.
pub fn with_group<S, C, T>(sync: &S, cpu: &C, group: LockGroup, f: impl FnOnce() -> T) -> T
where
    S: PortSync,
    C: CoreContext,
{
    let _guard = GroupGuard::lock(sync, cpu, group);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_group_orders_task_before_isr() {
        assert_eq!(LockGroup::KERNEL.task, LockId::Task);
        assert_eq!(LockGroup::KERNEL.isr, LockId::Isr);
    }

    #[test]
    fn object_groups_are_fixed() {
        assert_eq!(ObjectKind::Queue.lock_group(), LockGroup::shared(LockId::Queue));
        assert_eq!(ObjectKind::Timer.lock_group().isr, LockId::Timer);
        assert_eq!(ObjectKind::Kernel.lock_group(), LockGroup::KERNEL);
        assert_ne!(ObjectKind::EventGroup.lock_group(), ObjectKind::StreamBuffer.lock_group());
    }
}
