//! Diesel schema for phase and task persistence.

diesel::table! {
    /// Project phases.
    phases (id) {
        /// Phase identifier.
        id -> Uuid,
        /// Unique phase name.
        name -> Text,
        /// Completion flag.
        done -> Bool,
        /// Creation timestamp.
        created_on -> Timestamptz,
        /// Last mutation timestamp.
        updated_on -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks owned by phases.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning phase.
        phase_id -> Uuid,
        /// Task name.
        name -> Text,
        /// Completion flag.
        done -> Bool,
        /// Creation timestamp.
        created_on -> Timestamptz,
        /// Last mutation timestamp.
        updated_on -> Timestamptz,
    }
}

diesel::joinable!(tasks -> phases (phase_id));
diesel::allow_tables_to_appear_in_same_query!(phases, tasks);
