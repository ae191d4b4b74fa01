pub mod armature;
pub mod camera;
pub mod material;
pub mod mesh;
pub mod transform;

pub use armature::{ Armature, Joint };
pub use camera::{ CameraMovement, FreeLookCamera };
pub use transform::{ JointTransform, RotationLimit };
