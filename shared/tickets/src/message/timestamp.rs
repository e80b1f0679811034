use time::OffsetDateTime;

pub fn to_timestamp(datetime: OffsetDateTime) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: datetime.unix_timestamp(),
        nanos: datetime.nanosecond() as i32,
    }
}

pub fn from_timestamp(timestamp: &prost_types::Timestamp) -> Option<OffsetDateTime> {
    let nanos = i128::from(timestamp.seconds) * 1_000_000_000 + i128::from(timestamp.nanos);

    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}
