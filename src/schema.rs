diesel::table! {
    users (email) {
        email -> Text,
        display_name -> Text,
        role -> Nullable<Text>,
    }
}

diesel::table! {
    slots (name) {
        name -> Text,
        space -> Int4,
    }
}

diesel::table! {
    bookings (id) {
        id -> Uuid,
        slot_name -> Text,
        email -> Text,
        date -> Text,
        extra -> Jsonb,
        created_at -> Timestamptz,
    }
}
