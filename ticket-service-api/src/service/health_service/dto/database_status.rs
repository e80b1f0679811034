use strum::{AsRefStr, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Unreachable,
}
