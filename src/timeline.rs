use crate::resource::ResourceAssignment;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Stable identity of a timeline node.
pub type NodeId = Uuid;

/// Identity reserved for the implicit root group. Never a dependency target.
pub const ROOT_ID: NodeId = Uuid::nil();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Task,
}

/// A group owns an ordered sequence of children; its work range is derived
/// from theirs.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub id: NodeId,
    pub name: String,
    pub children: Vec<NodeId>,
}

/// A leaf of the plan tree carrying the actual workload.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub id: NodeId,
    pub name: String,
    /// Workload in business days; fractions are allowed (half a day = 0.5).
    pub workload_days: f64,
    /// Completion ratio in [0, 1]. Display-only; scheduling ignores it.
    pub progress: f64,
    /// Dependency edges: this task starts after every listed node ends.
    /// May reference tasks or groups anywhere in the tree.
    pub previous: Vec<NodeId>,
    /// Fixed calendar start overriding predecessor-derived begin.
    pub static_begin: Option<NaiveDate>,
    pub assignments: Vec<ResourceAssignment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineNode {
    Group(GroupNode),
    Task(TaskNode),
}

impl TimelineNode {
    pub fn id(&self) -> NodeId {
        match self {
            TimelineNode::Group(group) => group.id,
            TimelineNode::Task(task) => task.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TimelineNode::Group(group) => &group.name,
            TimelineNode::Task(task) => &task.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TimelineNode::Group(_) => NodeKind::Group,
            TimelineNode::Task(_) => NodeKind::Task,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    UnknownNode(NodeId),
    NotAGroup(NodeId),
    NotATask(NodeId),
    DuplicateId(NodeId),
    ReservedRoot,
    MoveIntoSelf(NodeId),
    InvalidWorkload(NodeId),
    InvalidProgress(NodeId),
}

impl fmt::Display for TimelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineError::UnknownNode(id) => write!(f, "unknown node {id}"),
            TimelineError::NotAGroup(id) => write!(f, "node {id} is not a group"),
            TimelineError::NotATask(id) => write!(f, "node {id} is not a task"),
            TimelineError::DuplicateId(id) => write!(f, "node id {id} already exists"),
            TimelineError::ReservedRoot => {
                write!(f, "the root id is reserved and cannot be used here")
            }
            TimelineError::MoveIntoSelf(id) => {
                write!(f, "cannot move node {id} into its own subtree")
            }
            TimelineError::InvalidWorkload(id) => {
                write!(f, "task {id} requires a finite non-negative workload")
            }
            TimelineError::InvalidProgress(id) => {
                write!(f, "task {id} requires progress between 0 and 1")
            }
        }
    }
}

impl std::error::Error for TimelineError {}

pub type TimelineResult<T> = Result<T, TimelineError>;

/// The plan tree: a node arena rooted at the implicit root group, plus a
/// parent index kept consistent by the mutation surface.
///
/// Calculations take `&Timeline` and never mutate it; edits go through the
/// methods here so children/parent stay in sync and dependency edges never
/// dangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    nodes: HashMap<NodeId, TimelineNode>,
    parents: HashMap<NodeId, NodeId>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_ID,
            TimelineNode::Group(GroupNode {
                id: ROOT_ID,
                name: String::new(),
                children: Vec::new(),
            }),
        );
        Self {
            nodes,
            parents: HashMap::new(),
        }
    }

    pub fn root(&self) -> &GroupNode {
        match self.nodes.get(&ROOT_ID) {
            Some(TimelineNode::Group(group)) => group,
            _ => unreachable!("the root group always exists"),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&TimelineNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Node count including the implicit root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.values().filter_map(|node| match node {
            TimelineNode::Task(task) => Some(task),
            TimelineNode::Group(_) => None,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupNode> {
        self.nodes.values().filter_map(|node| match node {
            TimelineNode::Group(group) => Some(group),
            TimelineNode::Task(_) => None,
        })
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(&id).map(TimelineNode::kind)
    }

    pub fn task(&self, id: NodeId) -> Option<&TaskNode> {
        match self.nodes.get(&id) {
            Some(TimelineNode::Task(task)) => Some(task),
            _ => None,
        }
    }

    pub fn group(&self, id: NodeId) -> Option<&GroupNode> {
        match self.nodes.get(&id) {
            Some(TimelineNode::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> TimelineResult<&[NodeId]> {
        match self.nodes.get(&id) {
            Some(TimelineNode::Group(group)) => Ok(&group.children),
            Some(TimelineNode::Task(_)) => Err(TimelineError::NotAGroup(id)),
            None => Err(TimelineError::UnknownNode(id)),
        }
    }

    /// Parent of `id`; `None` for the root (and for unknown ids).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Pre-order walk of the whole tree, root first. This is the display
    /// order of the chart rows.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT_ID];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(TimelineNode::Group(group)) = self.nodes.get(&id) {
                for child in group.children.iter().rev() {
                    stack.push(*child);
                }
            }
        }
        order
    }

    pub fn insert_task(&mut self, parent: NodeId, name: impl Into<String>) -> TimelineResult<NodeId> {
        self.insert_task_with_id(Uuid::new_v4(), parent, name)
    }

    pub fn insert_task_with_id(
        &mut self,
        id: NodeId,
        parent: NodeId,
        name: impl Into<String>,
    ) -> TimelineResult<NodeId> {
        self.attach(
            id,
            parent,
            TimelineNode::Task(TaskNode {
                id,
                name: name.into(),
                workload_days: 0.0,
                progress: 0.0,
                previous: Vec::new(),
                static_begin: None,
                assignments: Vec::new(),
            }),
        )
    }

    pub fn insert_group(&mut self, parent: NodeId, name: impl Into<String>) -> TimelineResult<NodeId> {
        self.insert_group_with_id(Uuid::new_v4(), parent, name)
    }

    pub fn insert_group_with_id(
        &mut self,
        id: NodeId,
        parent: NodeId,
        name: impl Into<String>,
    ) -> TimelineResult<NodeId> {
        self.attach(
            id,
            parent,
            TimelineNode::Group(GroupNode {
                id,
                name: name.into(),
                children: Vec::new(),
            }),
        )
    }

    fn attach(&mut self, id: NodeId, parent: NodeId, node: TimelineNode) -> TimelineResult<NodeId> {
        if id == ROOT_ID {
            return Err(TimelineError::ReservedRoot);
        }
        if self.nodes.contains_key(&id) {
            return Err(TimelineError::DuplicateId(id));
        }
        let parent_group = self.group_mut(parent)?;
        parent_group.children.push(id);
        self.nodes.insert(id, node);
        self.parents.insert(id, parent);
        Ok(id)
    }

    /// Remove a node and, for groups, its whole subtree. Dependency edges
    /// pointing at removed nodes are scrubbed so `previous` never dangles.
    pub fn remove_node(&mut self, id: NodeId) -> TimelineResult<()> {
        if id == ROOT_ID {
            return Err(TimelineError::ReservedRoot);
        }
        if !self.nodes.contains_key(&id) {
            return Err(TimelineError::UnknownNode(id));
        }

        let parent = self.parents[&id];
        if let Some(TimelineNode::Group(group)) = self.nodes.get_mut(&parent) {
            group.children.retain(|child| *child != id);
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                self.parents.remove(&current);
                removed.push(current);
                if let TimelineNode::Group(group) = node {
                    stack.extend(group.children);
                }
            }
        }

        for node in self.nodes.values_mut() {
            if let TimelineNode::Task(task) = node {
                task.previous.retain(|prev| !removed.contains(prev));
            }
        }
        Ok(())
    }

    /// Reorder or reparent a node. `index` is clamped to the new parent's
    /// child count; moving a group into its own subtree is rejected.
    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId, index: usize) -> TimelineResult<()> {
        if id == ROOT_ID {
            return Err(TimelineError::ReservedRoot);
        }
        if !self.nodes.contains_key(&id) {
            return Err(TimelineError::UnknownNode(id));
        }
        if new_parent == id || self.is_descendant(new_parent, id) {
            return Err(TimelineError::MoveIntoSelf(id));
        }
        // Validate the destination before detaching from the old parent.
        self.group_mut(new_parent)?;

        let old_parent = self.parents[&id];
        if let Some(TimelineNode::Group(group)) = self.nodes.get_mut(&old_parent) {
            group.children.retain(|child| *child != id);
        }

        let destination = self.group_mut(new_parent)?;
        let index = index.min(destination.children.len());
        destination.children.insert(index, id);
        self.parents.insert(id, new_parent);
        Ok(())
    }

    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> TimelineResult<()> {
        match self.nodes.get_mut(&id) {
            Some(TimelineNode::Group(group)) => {
                group.name = name.into();
                Ok(())
            }
            Some(TimelineNode::Task(task)) => {
                task.name = name.into();
                Ok(())
            }
            None => Err(TimelineError::UnknownNode(id)),
        }
    }

    pub fn set_workload(&mut self, id: NodeId, workload_days: f64) -> TimelineResult<()> {
        if !workload_days.is_finite() || workload_days < 0.0 {
            return Err(TimelineError::InvalidWorkload(id));
        }
        self.task_mut(id)?.workload_days = workload_days;
        Ok(())
    }

    pub fn set_progress(&mut self, id: NodeId, progress: f64) -> TimelineResult<()> {
        if !progress.is_finite() || !(0.0..=1.0).contains(&progress) {
            return Err(TimelineError::InvalidProgress(id));
        }
        self.task_mut(id)?.progress = progress;
        Ok(())
    }

    /// Replace a task's dependency set. Targets must exist and must not be
    /// the reserved root; a self-reference is allowed here because the
    /// calculator reports it as a per-node result rather than an edit error.
    pub fn set_previous(&mut self, id: NodeId, previous: Vec<NodeId>) -> TimelineResult<()> {
        for target in &previous {
            if *target == ROOT_ID {
                return Err(TimelineError::ReservedRoot);
            }
            if !self.nodes.contains_key(target) {
                return Err(TimelineError::UnknownNode(*target));
            }
        }
        self.task_mut(id)?.previous = previous;
        Ok(())
    }

    pub fn set_static_begin(&mut self, id: NodeId, date: Option<NaiveDate>) -> TimelineResult<()> {
        self.task_mut(id)?.static_begin = date;
        Ok(())
    }

    pub fn set_assignments(
        &mut self,
        id: NodeId,
        assignments: Vec<ResourceAssignment>,
    ) -> TimelineResult<()> {
        self.task_mut(id)?.assignments = assignments;
        Ok(())
    }

    fn group_mut(&mut self, id: NodeId) -> TimelineResult<&mut GroupNode> {
        match self.nodes.get_mut(&id) {
            Some(TimelineNode::Group(group)) => Ok(group),
            Some(TimelineNode::Task(_)) => Err(TimelineError::NotAGroup(id)),
            None => Err(TimelineError::UnknownNode(id)),
        }
    }

    fn task_mut(&mut self, id: NodeId) -> TimelineResult<&mut TaskNode> {
        match self.nodes.get_mut(&id) {
            Some(TimelineNode::Task(task)) => Ok(task),
            Some(TimelineNode::Group(_)) => Err(TimelineError::NotATask(id)),
            None => Err(TimelineError::UnknownNode(id)),
        }
    }

    fn is_descendant(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        let mut current = candidate;
        while let Some(parent) = self.parents.get(&current).copied() {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }
}
