pub mod detection_view;
