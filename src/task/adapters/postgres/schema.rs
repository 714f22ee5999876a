//! Diesel schema for task persistence.

diesel::table! {
    /// To-do records.
    todos (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Completion flag.
        is_done -> Bool,
        /// Pin flag.
        is_favorite -> Bool,
        /// Optional due time.
        due_time -> Nullable<Timestamptz>,
        /// Optional reminder time.
        reminder_time -> Nullable<Timestamptz>,
        /// Timestamp of the latest write.
        modified_time -> Timestamptz,
    }
}
