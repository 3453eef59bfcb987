use ocg_core::transform::name_normalizer::{
    NameAllocator, normalize_name, route_to_name, sanitize_identifier, sanitize_model_name,
    to_snake_case,
};
use ocg_core::transform::namespace::{ModelLayout, NamespaceNode, import_path};

#[test]
fn test_camel_case_input() {
    let n = normalize_name("createChatCompletion");
    assert_eq!(n.pascal_case, "CreateChatCompletion");
    assert_eq!(n.camel_case, "createChatCompletion");
    assert_eq!(n.snake_case, "create_chat_completion");
    assert_eq!(n.screaming_snake, "CREATE_CHAT_COMPLETION");
}

#[test]
fn test_kebab_case_input() {
    let n = normalize_name("pet-store-api");
    assert_eq!(n.pascal_case, "PetStoreApi");
    assert_eq!(n.snake_case, "pet_store_api");
}

#[test]
fn test_path_like_input() {
    let n = normalize_name("/pets/{petId}");
    assert_eq!(n.pascal_case, "PetsPetId");
    assert_eq!(n.snake_case, "pets_pet_id");
}

#[test]
fn test_method_name_candidates() {
    assert_eq!(sanitize_identifier(&to_snake_case("createItem")), "create_item");
    assert_eq!(sanitize_identifier(&to_snake_case("import")), "import_");
    assert_eq!(sanitize_identifier(&to_snake_case("List-Users.v2")), "list_users_v2");
    assert_eq!(route_to_name("GET", "/v1/items/{itemId}"), "get_v1_items");
}

#[test]
fn test_same_route_same_name() {
    for (verb, path) in [("GET", "/a/b/{id}"), ("PUT", "/one/{x}/two"), ("DELETE", "/")] {
        assert_eq!(route_to_name(verb, path), route_to_name(verb, path));
    }
}

#[test]
fn test_allocator_never_repeats() {
    let mut names = NameAllocator::with_reserved(["close"]);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..50 {
        assert!(seen.insert(names.allocate_with("close", Some("by_id"))));
    }
}

#[test]
fn test_model_names() {
    assert_eq!(sanitize_model_name("Order"), "Order");
    assert_eq!(sanitize_model_name("v1"), "v1");
    assert_eq!(sanitize_model_name("2fa"), "Model_2fa");
    assert_eq!(sanitize_model_name("class"), "class_");
}

#[test]
fn test_import_path_walks_to_target() {
    let names = [
        "Root",
        "a.A",
        "a.b.B",
        "a.b.c.C",
        "x.y.Y",
        "x.X",
        "a.b.B2",
    ];
    let layout = ModelLayout::build(names);
    for from in layout.nodes() {
        for to in layout.nodes() {
            let path = import_path(&from.folders, to);
            assert_eq!(
                path.target_folders(&from.folders).as_ref(),
                Some(&to.folders),
                "{} -> {}",
                from.schema_name,
                to.schema_name
            );
            // every target class is listed in the folder it lands in
            let folder = layout.folder(&to.folders).expect("folder exists");
            assert!(folder.classes.contains(&to.class_name));
        }
    }
}

#[test]
fn test_import_path_strings() {
    let from = NamespaceNode::from_schema_name("a.b.B");
    let same = import_path(&from.folders, &NamespaceNode::from_schema_name("a.b.B2"));
    assert!(same.is_same_folder());
    assert_eq!(same.to_module_string(), ".B2");

    let up = import_path(&from.folders, &NamespaceNode::from_schema_name("Root"));
    assert_eq!(up.to_module_string(), "...Root");

    let across = import_path(&from.folders, &NamespaceNode::from_schema_name("x.y.Y"));
    assert_eq!(across.up, 2);
    assert_eq!(across.to_module_string(), "...x.y.Y");

    let down = import_path(&[], &NamespaceNode::from_schema_name("a.b.c.C"));
    assert_eq!(down.to_module_string(), ".a.b.c.C");
}
