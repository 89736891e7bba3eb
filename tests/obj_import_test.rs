use orbit_viewer::{
    data_structures::model::Shading,
    resources::{self, flatten_scene, obj_scene::DEFAULT_MATERIAL_NAME},
};

use crate::common::test_utils::{RecordingFactory, TempDir, rgba_image};

mod common;

const CAR_MTL: &str = "\
newmtl Paint
Kd 0.8 0.1 0.1
d 1.0
map_Kd C:\\textures\\paint.png

newmtl TailLight
Kd 0.5 0.5 0.5

newmtl Windshield
Kd 1.0 1.0 1.0
d 0.4
";

const CAR_OBJ: &str = "\
mtllib car.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
o body
usemtl Paint
f 1/1/1 2/2/1 3/3/1 4/4/1
o tail
usemtl TailLight
f 1/1/1 2/2/1 3/3/1
o glass
usemtl Windshield
f 1/1/1 3/3/1 4/4/1
";

const BARE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 0 0 1
f 1 2 3
";

#[test]
fn obj_objects_become_children_of_the_file_node() {
    let dir = TempDir::new("obj-layout");
    dir.write("car.mtl", CAR_MTL);
    let path = dir.write("car.obj", CAR_OBJ);

    let scene = resources::load_scene(&path).expect("car.obj imports");

    let root = scene.root_node().expect("scene has a root");
    assert_eq!(root.name, "car.obj");
    assert!(root.meshes.is_empty());
    assert_eq!(root.children.len(), 3);
    let names: Vec<&str> = root
        .children
        .iter()
        .map(|&c| scene.nodes[c].name.as_str())
        .collect();
    assert_eq!(names, vec!["body", "tail", "glass"]);
    assert_eq!(scene.meshes.len(), 3);
    assert_eq!(scene.materials.len(), 3);
}

#[test]
fn quads_are_triangulated() {
    let dir = TempDir::new("obj-triangulate");
    dir.write("car.mtl", CAR_MTL);
    let path = dir.write("car.obj", CAR_OBJ);

    let scene = resources::load_scene(&path).expect("car.obj imports");
    let body = &scene.meshes[0];

    assert_eq!(body.faces.len(), 2);
    let buffers = flatten_scene(&scene).expect("car.obj flattens");
    assert_eq!(buffers.submeshes[0].index_count, 6);
    assert_eq!(buffers.submeshes[0].base_vertex, 0);
    assert_eq!(buffers.submeshes[0].base_index, 0);
}

#[test]
fn materials_are_classified_with_texture_fallback() {
    let dir = TempDir::new("obj-materials");
    dir.write("car.mtl", CAR_MTL);
    dir.write_image("textures/paint.png", rgba_image(2, 2, [255, 0, 0, 255]));
    let path = dir.write("car.obj", CAR_OBJ);

    let scene = resources::load_scene(&path).expect("car.obj imports");
    let mut factory = RecordingFactory::default();
    let search_dirs = [dir.path().to_path_buf(), dir.path().join("textures")];
    let model =
        resources::load_model(&scene, &search_dirs, &mut factory).expect("car.obj loads");

    assert_eq!(model.materials.len(), 3);
    let paint = &model.materials[0];
    assert_eq!(paint.shading(), Shading::Opaque);
    assert_eq!(paint.diffuse_color, [0.8, 0.1, 0.1]);
    assert_eq!(factory.image(paint.texture).width, 2);

    assert_eq!(model.materials[1].shading(), Shading::Emissive);
    assert_eq!(
        model.materials[2].shading(),
        Shading::Transparent { amount: 0.4 }
    );
    // paint.png plus one shared white texture
    assert_eq!(factory.created.len(), 2);
    assert_eq!(model.materials[1].texture, model.materials[2].texture);
    assert_eq!(model.dangling_submeshes().count(), 0);
}

#[test]
fn missing_usemtl_gets_the_default_material() {
    let dir = TempDir::new("obj-default-material");
    let path = dir.write("bare.obj", BARE_OBJ);

    let scene = resources::load_scene(&path).expect("bare.obj imports");

    assert_eq!(scene.materials.len(), 1);
    assert_eq!(
        scene.materials[0].name.as_deref(),
        Some(DEFAULT_MATERIAL_NAME)
    );
    assert_eq!(scene.meshes[0].material_index, 0);
}

#[test]
fn missing_normals_are_generated() {
    let dir = TempDir::new("obj-normals");
    let path = dir.write("bare.obj", BARE_OBJ);

    let scene = resources::load_scene(&path).expect("bare.obj imports");
    let normals = scene.meshes[0]
        .normals
        .as_ref()
        .expect("normals are generated");

    // counter-clockwise seen from -y
    for normal in normals {
        assert!((normal[1] + 1.0).abs() < 1e-5, "unexpected normal {normal:?}");
    }
}

#[test]
fn missing_material_library_is_not_fatal() {
    let dir = TempDir::new("obj-missing-mtl");
    let path = dir.write("car.obj", CAR_OBJ);

    let scene = resources::load_scene(&path).expect("car.obj imports without car.mtl");

    assert_eq!(scene.meshes.len(), 3);
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new("obj-missing-file");
    assert!(resources::load_scene(&dir.path().join("nothing.obj")).is_err());
}

#[test]
fn unknown_extension_is_an_error() {
    let dir = TempDir::new("obj-extension");
    let path = dir.write("model.fbx", "not supported");

    let err = resources::load_scene(&path).expect_err("fbx is not supported");
    assert!(err.to_string().contains("unsupported"));
}
