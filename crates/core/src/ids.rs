use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
  ($name:ident) => {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct $name(pub Uuid);

    impl $name {
      pub fn new() -> Self {
        Self(Uuid::now_v7())
      }
    }

    impl Default for $name {
      fn default() -> Self {
        Self::new()
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl From<Uuid> for $name {
      fn from(value: Uuid) -> Self {
        Self(value)
      }
    }

    impl std::str::FromStr for $name {
      type Err = uuid::Error;

      fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
      }
    }
  };
}

macro_rules! int_id {
  ($name:ident) => {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct $name(pub i64);

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl From<i64> for $name {
      fn from(value: i64) -> Self {
        Self(value)
      }
    }
  };
}

// Cross-cutting aggregates are identified by UUID; insertion order is irrelevant.
uuid_id!(ProjectId);
uuid_id!(DatasetId);
uuid_id!(WatchDirId);
uuid_id!(ChunkUuid);
uuid_id!(CycleId);

// Per-file records are monotonic integers assigned by the database.
int_id!(FileId);
int_id!(ClassId);
int_id!(MethodId);
int_id!(FunctionId);
int_id!(ImportId);
int_id!(IssueId);
int_id!(UsageId);
int_id!(CrossRefId);
int_id!(ChunkId);
int_id!(DuplicateId);
int_id!(OccurrenceId);
int_id!(VectorIndexId);
