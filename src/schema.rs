// Archboard schema - saved diagram tables for Diesel ORM

diesel::table! {
    schema_versions (id) {
        id -> Integer,
        version -> Text,
        name -> Text,
        features -> Text,
        introduced_at -> Text,
    }
}

diesel::table! {
    saved_diagrams (id) {
        id -> Integer,
        name -> Text,
        description -> Nullable<Text>,
        diagram_type -> Text,
        diagram_text -> Text,
        filters_json -> Nullable<Text>,
        is_public -> Bool,
        created_by -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    usage_history (id) {
        id -> Integer,
        user_id -> Nullable<Text>,
        action -> Text,
        details_json -> Nullable<Text>,
        created_at -> Text,
    }
}
