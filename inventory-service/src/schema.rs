diesel::table! {
    inventory (product_id) {
        product_id -> Int8,
        quantity -> Int8,
    }
}

diesel::table! {
    purchase_history (id) {
        id -> Int8,
        product_id -> Int8,
        quantity -> Int8,
        date -> Timestamptz,
        status -> Varchar,
        message -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    inventory,
    purchase_history,
);
